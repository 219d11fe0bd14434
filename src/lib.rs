//! Async Rust SDK for the Bizdesk business-management API.
//!
//! Every record and request type implements [`Model`], so it can be built
//! from and exported to a JSON map with required fields and enum values
//! checked on the way in.
//!
//! ```ignore
//! use bizdesk::{Client, DocumentLine, InvoiceCreateRequest};
//!
//! let client = Client::from_env()?;
//! let invoice = client
//!     .invoices()
//!     .create(InvoiceCreateRequest::new(7, vec![DocumentLine::new("Audit", 1.0, 1500.0)]))
//!     .await?;
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::result_large_err)]

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.bizdesk.io/v1";

/// Default client identification header value.
pub(crate) const DEFAULT_CLIENT_HEADER: &str = concat!("bizdesk-rust/", env!("CARGO_PKG_VERSION"));

/// Default connection timeout (5 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Default request timeout (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// HTTP header name for request ID tracing.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP header selecting the company for multi-company accounts.
pub const COMPANY_HEADER: &str = "X-Company-Id";

pub(crate) const CLIENT_HEADER: &str = "X-Bizdesk-Client";

pub(crate) const API_TOKEN_ENV: &str = "BIZDESK_API_TOKEN";
pub(crate) const BASE_URL_ENV: &str = "BIZDESK_BASE_URL";
pub(crate) const COMPANY_ID_ENV: &str = "BIZDESK_COMPANY_ID";

#[macro_use]
mod macros;

mod absence_types;
mod absences;
mod client;
mod clients;
mod common;
mod companies;
mod core;
mod delivery_receipts;
mod documents;
mod errors;
mod http;
mod identifiers;
mod invoices;
mod model;
mod payment_methods;
mod product_categories;
mod products;
mod purchases;
mod quotes;
mod telemetry;
mod users;

#[doc(hidden)]
pub mod testing;

pub use client::{Client, Config};
pub use errors::{
    APIError, Error, FieldError, Result, RetryMetadata, TransportError, TransportErrorKind,
    ValidationError,
};
pub use http::{HeaderEntry, HeaderList, RequestOptions, RetryConfig};
pub use identifiers::{CountryCode, CurrencyCode, LocaleCode};
pub use model::Model;
pub use telemetry::{HttpRequestMetrics, MetricsCallbacks, RequestContext};

pub use common::{
    Address, CsvImportOptions, EmailDelivery, EmailRequest, ImportReport, ImportRowError,
    ListParams, Page, PageMeta, SortOrder, MAX_PER_PAGE,
};
pub use documents::{DocumentLine, Payment, PaymentRequest, Totals};

pub use absence_types::{
    AbsenceType, AbsenceTypeCreateRequest, AbsenceTypeUpdateRequest, AbsenceTypesClient,
};
pub use absences::{
    Absence, AbsenceCreateRequest, AbsenceListParams, AbsenceState, AbsenceUpdateRequest,
    AbsencesClient, DayPeriod,
};
pub use clients::{
    ClientCreateRequest, ClientKind, ClientListParams, ClientRecord,
    ClientUpdateRequest, ClientsClient, Contact,
};
pub use companies::{CompaniesClient, Company, CompanyUpdateRequest};
pub use delivery_receipts::{
    DeliveryLine, DeliveryReceipt, DeliveryReceiptCreateRequest, DeliveryReceiptListParams,
    DeliveryReceiptUpdateRequest, DeliveryReceiptsClient, DeliveryState,
};
pub use invoices::{
    Invoice, InvoiceCreateRequest, InvoiceListParams, InvoiceState, InvoiceUpdateRequest,
    InvoicesClient,
};
pub use payment_methods::{
    PaymentMethod, PaymentMethodCreateRequest, PaymentMethodKind, PaymentMethodUpdateRequest,
    PaymentMethodsClient,
};
pub use product_categories::{
    ProductCategoriesClient, ProductCategory, ProductCategoryCreateRequest,
    ProductCategoryUpdateRequest,
};
pub use products::{
    Product, ProductCreateRequest, ProductKind, ProductListParams, ProductUpdateRequest,
    ProductsClient,
};
pub use purchases::{
    Purchase, PurchaseCreateRequest, PurchaseListParams, PurchaseState, PurchaseUpdateRequest,
    PurchasesClient,
};
pub use quotes::{
    Quote, QuoteCreateRequest, QuoteListParams, QuoteState, QuoteUpdateRequest, QuotesClient,
};
pub use users::{User, UserCreateRequest, UserListParams, UserRole, UserUpdateRequest, UsersClient};
