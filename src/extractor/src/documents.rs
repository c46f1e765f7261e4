use anyhow::Context;
use serde::Deserialize;

use changelog::ChangeEvent;

use crate::{
    model::{DocumentContent, DocumentRecord},
    provider::KycProvider,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicantRef {
    id: String,
    inspection_id: String,
}

#[derive(Deserialize)]
struct DocumentResources {
    items: Vec<DocumentResource>,
}

#[derive(Deserialize)]
struct DocumentResource {
    id: String,
}

/// Fetches every document image of the applicant described by `payload`.
///
/// Never fails: problems become error records so the run carries on.
pub(crate) async fn collect<P: KycProvider>(
    provider: &P,
    event: &ChangeEvent,
    payload: &str,
) -> Vec<DocumentRecord> {
    let record = |applicant_id: Option<&str>, image_id: Option<&str>, content| DocumentRecord {
        customer_id: event.customer_id.clone(),
        recorded_at: event.changed_at,
        applicant_id: applicant_id.map(str::to_string),
        image_id: image_id.map(str::to_string),
        content,
    };

    let (applicant, image_ids) = match list_images(provider, payload).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(customer_id = %event.customer_id, error = %format!("{e:#}"), "document listing failed");
            return vec![record(None, None, DocumentContent::Error(format!("{e:#}")))];
        }
    };

    let mut records = Vec::with_capacity(image_ids.len());
    for image_id in image_ids {
        let content = match provider
            .document_image(&applicant.inspection_id, &image_id)
            .await
        {
            Ok(Some(image)) => DocumentContent::Image(image),
            Ok(None) => DocumentContent::Missing,
            Err(e) => {
                tracing::warn!(customer_id = %event.customer_id, image_id = %image_id, error = %e, "document image fetch failed");
                DocumentContent::Error(e.to_string())
            }
        };
        records.push(record(Some(&applicant.id), Some(&image_id), content));
    }
    records
}

async fn list_images<P: KycProvider>(
    provider: &P,
    payload: &str,
) -> anyhow::Result<(ApplicantRef, Vec<String>)> {
    let applicant: ApplicantRef = serde_json::from_str(payload)
        .context("applicant payload lacks id or inspectionId")?;
    let metadata = provider
        .document_metadata(&applicant.id)
        .await
        .context("listing document metadata")?;
    let resources: DocumentResources =
        serde_json::from_str(&metadata).context("malformed document metadata")?;

    Ok((
        applicant,
        resources.items.into_iter().map(|item| item.id).collect(),
    ))
}
