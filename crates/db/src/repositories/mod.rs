//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The billing orchestrator ([`BillingService`]) lives here
//! too: it composes the subscriber, usage, and bill repositories into the
//! get-or-calculate workflow the payment path depends on.

pub mod bill;
pub mod billing;
pub mod payment;
pub mod subscriber;
pub mod usage;
pub mod user;

pub use bill::BillRepository;
pub use billing::{BillingError, BillingService};
pub use payment::{BillResolver, PaymentError, PaymentReceipt, PaymentRepository};
pub use subscriber::SubscriberRepository;
pub use usage::{MonthlyUsage, UsageError, UsageRepository};
pub use user::UserRepository;
