//! Client SDK for the Soko marketplace
//!
//! Provides a typed API client for the market service and the payment
//! orchestrator that sequences a listing-creation attempt: stage image
//! uploads, open a payable order, collect payment through a widget, verify
//! the receipt, and finally submit the listing.

pub mod api;
pub mod forms;
pub mod orchestrator;

pub use api::{ApiClient, ClientError, MarketBackend, PayableOrder, PaymentReceipt};
pub use forms::{FileAttachment, ListingForm, ListingPayload};
pub use orchestrator::{
    FailureReason, OrchestratorState, PaymentOrchestrator, PaymentWidget, submit_update,
};
