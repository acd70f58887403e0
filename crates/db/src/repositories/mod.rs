//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! Every multi-entity financial operation runs inside one database
//! transaction with row-locked read-then-write on invoice items, so the
//! core engines' all-or-nothing contracts hold against the store.

pub mod carry_forward;
pub mod fee_structure;
pub mod invoice;
pub mod payment;

pub use carry_forward::{CarryForwardError, CarryForwardInput, CarryForwardRepository, TransferWithDetails};
pub use fee_structure::{
    CreateFeeStructureInput, FeeStructureError, FeeStructureItemInput, FeeStructureRepository,
    FeeStructureWithItems,
};
pub use invoice::{CreateInvoiceInput, InvoiceError, InvoiceRepository, InvoiceWithItems};
pub use payment::{AllocatePaymentInput, PaymentError, PaymentRepository, PaymentWithItems};
