use std::future::Future;

use sumsub::{SumsubClient, SumsubError};

/// The provider calls a run depends on.
pub trait KycProvider {
    fn fetch_applicant(
        &self,
        customer_id: &str,
    ) -> impl Future<Output = Result<String, SumsubError>> + Send;

    fn document_metadata(
        &self,
        applicant_id: &str,
    ) -> impl Future<Output = Result<String, SumsubError>> + Send;

    fn document_image(
        &self,
        inspection_id: &str,
        image_id: &str,
    ) -> impl Future<Output = Result<Option<String>, SumsubError>> + Send;
}

impl KycProvider for SumsubClient {
    async fn fetch_applicant(&self, customer_id: &str) -> Result<String, SumsubError> {
        self.get_applicant(customer_id).await
    }

    async fn document_metadata(&self, applicant_id: &str) -> Result<String, SumsubError> {
        self.get_document_metadata(applicant_id).await
    }

    async fn document_image(
        &self,
        inspection_id: &str,
        image_id: &str,
    ) -> Result<Option<String>, SumsubError> {
        self.get_document_image(inspection_id, image_id).await
    }
}
