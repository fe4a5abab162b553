//! Payment orchestrator
//!
//! Sequences one listing-creation attempt: stage image uploads, open a
//! payable order, collect payment through the widget, verify the receipt,
//! then submit the listing. The machine is per-attempt and holds no state
//! across process restarts; a crash between verification and submission
//! loses the payment with no reconciliation.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ClientError, ListingCreated, MarketBackend, PayableOrder, PaymentReceipt};
use crate::forms::{FileAttachment, ListingForm};

/// Where a listing-creation attempt currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    OrderRequested,
    PaymentPending,
    Verified,
    ListingSubmitted,
    Failed(FailureReason),
}

/// Why an attempt ended in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The server refused to open an order for this account
    OrderNotPermitted,
    /// Order creation failed for any other reason
    OrderFailed,
    /// The widget reported the payment itself failed
    PaymentFailed,
    /// The server rejected the completion receipt
    VerificationFailed,
    /// Payment went through but the listing submission failed
    SubmissionFailed,
}

/// Error reported by the payment widget
#[derive(Error, Debug)]
#[error("Payment failed: {0}")]
pub struct WidgetError(pub String);

/// The external payment UI collecting the actual payment
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    /// Open the widget for an order; the completion callback yields a receipt
    async fn collect_payment(&self, order: &PayableOrder) -> Result<PaymentReceipt, WidgetError>;
}

/// Drives one listing-creation attempt end to end
pub struct PaymentOrchestrator<B, W> {
    backend: B,
    widget: W,
    state: OrchestratorState,
}

impl<B: MarketBackend, W: PaymentWidget> PaymentOrchestrator<B, W> {
    /// Create a new orchestrator in the idle state
    pub fn new(backend: B, widget: W) -> Self {
        Self {
            backend,
            widget,
            state: OrchestratorState::Idle,
        }
    }

    /// Current state of the attempt
    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Run one listing-creation attempt
    ///
    /// Images are uploaded up front, one at a time in selection order; a
    /// failed upload is skipped and the remaining URLs still submitted.
    pub async fn run(&mut self, form: ListingForm) -> Result<ListingCreated, ClientError> {
        let files = form.files.clone();
        let feature_file = form.feature_file.clone();

        let photo_urls = upload_sequentially(&self.backend, &files).await;
        let feature_url = match &feature_file {
            Some(file) => upload_sequentially(&self.backend, std::slice::from_ref(file))
                .await
                .into_iter()
                .next(),
            None => None,
        };

        let payload = form.into_payload(photo_urls, feature_url);

        self.state = OrchestratorState::OrderRequested;
        let order = match self.backend.create_order().await {
            Ok(order) => order,
            Err(ClientError::NotPermitted) => {
                self.state = OrchestratorState::Failed(FailureReason::OrderNotPermitted);
                return Err(ClientError::NotPermitted);
            }
            Err(e) => {
                self.state = OrchestratorState::Failed(FailureReason::OrderFailed);
                return Err(e);
            }
        };

        self.state = OrchestratorState::PaymentPending;
        let receipt = match self.widget.collect_payment(&order).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.state = OrchestratorState::Failed(FailureReason::PaymentFailed);
                return Err(ClientError::Api(e.to_string()));
            }
        };

        if let Err(e) = self.backend.verify_payment(&receipt).await {
            self.state = OrchestratorState::Failed(FailureReason::VerificationFailed);
            return Err(e);
        }
        self.state = OrchestratorState::Verified;

        match self.backend.create_listing(&payload).await {
            Ok(created) => {
                self.state = OrchestratorState::ListingSubmitted;
                info!("Listing submitted after verified payment {}", receipt.payment_id);
                Ok(created)
            }
            Err(e) => {
                self.state = OrchestratorState::Failed(FailureReason::SubmissionFailed);
                Err(e)
            }
        }
    }
}

///// Update an existing listing: upload any new files, then submit
///
/// No payment leg; the listing fee covers creation only.
pub async fn submit_update<B: MarketBackend>(
    backend: &B,
    form: ListingForm,
    listing_id: &str,
) -> Result<(), ClientError> {
    let files = form.files.clone();
    let feature_file = form.feature_file.clone();

    let photo_urls = upload_sequentially(backend, &files).await;
    let feature_url = match &feature_file {
        Some(file) => upload_sequentially(backend, std::slice::from_ref(file))
            .await
            .into_iter()
            .next(),
        None => None,
    };

    let mut payload = form.into_payload(photo_urls, feature_url);
    payload.listing_id = Some(listing_id.to_string());

    backend.update_listing(&payload).await
}

/// Upload files one at a time, in order, skipping failures
async fn upload_sequentially<B: MarketBackend>(
    backend: &B,
    files: &[FileAttachment],
) -> Vec<String> {
    let mut urls = Vec::new();
    for file in files {
        match backend.upload_image(file).await {
            Ok(url) => urls.push(url),
            Err(e) => {
                warn!("Upload failed for {}, skipping: {}", file.file_name, e);
            }
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::ListingPayload;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeBackend {
        fail_uploads: HashSet<String>,
        order_error: Option<fn() -> ClientError>,
        verify_ok: bool,
        create_ok: bool,
        uploads: Mutex<Vec<String>>,
        verify_calls: AtomicUsize,
        created: Mutex<Vec<ListingPayload>>,
        updated: Mutex<Vec<ListingPayload>>,
    }

    impl FakeBackend {
        fn happy() -> Self {
            Self {
                verify_ok: true,
                create_ok: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl MarketBackend for FakeBackend {
        async fn upload_image(&self, file: &FileAttachment) -> Result<String, ClientError> {
            if self.fail_uploads.contains(&file.file_name) {
                return Err(ClientError::Api("upload rejected".to_string()));
            }
            let url = format!("https://img.example/{}", file.file_name);
            self.uploads.lock().unwrap().push(url.clone());
            Ok(url)
        }

        async fn create_order(&self) -> Result<PayableOrder, ClientError> {
            if let Some(make_err) = self.order_error {
                return Err(make_err());
            }
            Ok(PayableOrder {
                id: "order_1".to_string(),
                amount: 9900,
                currency: "INR".to_string(),
            })
        }

        async fn verify_payment(&self, _receipt: &PaymentReceipt) -> Result<(), ClientError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            if self.verify_ok {
                Ok(())
            } else {
                Err(ClientError::Api("Payment verification failed".to_string()))
            }
        }

        async fn create_listing(
            &self,
            payload: &ListingPayload,
        ) -> Result<ListingCreated, ClientError> {
            if !self.create_ok {
                return Err(ClientError::Api("Server Error".to_string()));
            }
            self.created.lock().unwrap().push(payload.clone());
            Ok(ListingCreated {
                success: true,
                message: "Product listed successfully".to_string(),
                data: serde_json::json!({"id": "l1"}),
                user_details: None,
            })
        }

        async fn update_listing(&self, payload: &ListingPayload) -> Result<(), ClientError> {
            self.updated.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct HappyWidget;

    #[async_trait]
    impl PaymentWidget for HappyWidget {
        async fn collect_payment(
            &self,
            order: &PayableOrder,
        ) -> Result<PaymentReceipt, WidgetError> {
            Ok(PaymentReceipt {
                order_id: order.id.clone(),
                payment_id: "pay_1".to_string(),
                signature: "sig".to_string(),
            })
        }
    }

    struct FailingWidget;

    #[async_trait]
    impl PaymentWidget for FailingWidget {
        async fn collect_payment(
            &self,
            _order: &PayableOrder,
        ) -> Result<PaymentReceipt, WidgetError> {
            Err(WidgetError("card declined".to_string()))
        }
    }

    fn file(name: &str) -> FileAttachment {
        FileAttachment {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn form_with_files(names: &[&str]) -> ListingForm {
        ListingForm {
            title: "Bike".to_string(),
            brand: "Atlas".to_string(),
            price: "1,999".to_string(),
            features: serde_json::json!({"condition": "new"}),
            files: names.iter().map(|n| file(n)).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_happy_path_submits_listing() {
        let mut orch = PaymentOrchestrator::new(FakeBackend::happy(), HappyWidget);
        let created = orch.run(form_with_files(&["a.png", "b.png"])).await.unwrap();

        assert!(created.success);
        assert_eq!(orch.state(), OrchestratorState::ListingSubmitted);

        let payloads = orch.backend.created.lock().unwrap();
        let photos: Vec<String> =
            serde_json::from_str(payloads[0].photos.as_deref().unwrap()).unwrap();
        assert_eq!(
            photos,
            vec!["https://img.example/a.png", "https://img.example/b.png"]
        );
    }

    #[tokio::test]
    async fn test_failed_upload_is_skipped_not_fatal() {
        let mut backend = FakeBackend::happy();
        backend.fail_uploads.insert("a.png".to_string());

        let mut orch = PaymentOrchestrator::new(backend, HappyWidget);
        orch.run(form_with_files(&["a.png", "b.png"])).await.unwrap();

        assert_eq!(orch.state(), OrchestratorState::ListingSubmitted);
        let payloads = orch.backend.created.lock().unwrap();
        let photos: Vec<String> =
            serde_json::from_str(payloads[0].photos.as_deref().unwrap()).unwrap();
        assert_eq!(photos, vec!["https://img.example/b.png"]);
    }

    #[tokio::test]
    async fn test_feature_image_merged_into_features() {
        let mut form = form_with_files(&[]);
        form.feature_file = Some(file("feat.png"));

        let mut orch = PaymentOrchestrator::new(FakeBackend::happy(), HappyWidget);
        orch.run(form).await.unwrap();

        let payloads = orch.backend.created.lock().unwrap();
        let features: serde_json::Value = serde_json::from_str(&payloads[0].features).unwrap();
        assert_eq!(features["image"], "https://img.example/feat.png");
        assert_eq!(features["condition"], "new");
    }

    #[tokio::test]
    async fn test_order_not_permitted() {
        let mut backend = FakeBackend::happy();
        backend.order_error = Some(|| ClientError::NotPermitted);

        let mut orch = PaymentOrchestrator::new(backend, HappyWidget);
        let err = orch.run(form_with_files(&[])).await.unwrap_err();

        assert!(matches!(err, ClientError::NotPermitted));
        assert_eq!(
            orch.state(),
            OrchestratorState::Failed(FailureReason::OrderNotPermitted)
        );
    }

    #[tokio::test]
    async fn test_order_generic_failure() {
        let mut backend = FakeBackend::happy();
        backend.order_error = Some(|| ClientError::Transport("connection refused".to_string()));

        let mut orch = PaymentOrchestrator::new(backend, HappyWidget);
        orch.run(form_with_files(&[])).await.unwrap_err();

        assert_eq!(
            orch.state(),
            OrchestratorState::Failed(FailureReason::OrderFailed)
        );
    }

    #[tokio::test]
    async fn test_widget_failure_skips_verification() {
        let mut orch = PaymentOrchestrator::new(FakeBackend::happy(), FailingWidget);
        orch.run(form_with_files(&[])).await.unwrap_err();

        assert_eq!(
            orch.state(),
            OrchestratorState::Failed(FailureReason::PaymentFailed)
        );
        assert_eq!(orch.backend.verify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_verification_failure_blocks_submission() {
        let mut backend = FakeBackend::happy();
        backend.verify_ok = false;

        let mut orch = PaymentOrchestrator::new(backend, HappyWidget);
        orch.run(form_with_files(&[])).await.unwrap_err();

        assert_eq!(
            orch.state(),
            OrchestratorState::Failed(FailureReason::VerificationFailed)
        );
        assert!(orch.backend.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_failure_after_verified_payment() {
        let mut backend = FakeBackend::happy();
        backend.create_ok = false;

        let mut orch = PaymentOrchestrator::new(backend, HappyWidget);
        orch.run(form_with_files(&[])).await.unwrap_err();

        assert_eq!(
            orch.state(),
            OrchestratorState::Failed(FailureReason::SubmissionFailed)
        );
        assert_eq!(orch.backend.verify_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_update_sets_listing_id() {
        let backend = FakeBackend::happy();
        // Goes through the crate-root re-export, the path SDK callers use.
        crate::submit_update(&backend, form_with_files(&["c.png"]), "listing-1")
            .await
            .unwrap();

        let updated = backend.updated.lock().unwrap();
        assert_eq!(updated[0].listing_id.as_deref(), Some("listing-1"));
        let photos: Vec<String> =
            serde_json::from_str(updated[0].photos.as_deref().unwrap()).unwrap();
        assert_eq!(photos, vec!["https://img.example/c.png"]);
    }

    #[tokio::test]
    async fn test_submit_update_without_new_files_omits_photos() {
        let backend = FakeBackend::happy();
        submit_update(&backend, form_with_files(&[]), "listing-1")
            .await
            .unwrap();

        let updated = backend.updated.lock().unwrap();
        assert!(updated[0].photos.is_none());
    }
}
