//! Domain layer containing core business types, traits, pricing rules and
//! error definitions.

pub mod competition;
pub mod error;
pub mod numeric;
pub mod pricing;
pub mod sanitize;
pub mod traits;
pub mod types;

pub use competition::CompetitionLevel;
pub use error::{AppError, ConfigError, DatabaseError, SanitizeError, ValidationError};
pub use numeric::{NumericInput, get_number_from_string, to_number};
pub use pricing::{
    DEFAULT_CNY_CURRENCY, DEFAULT_DELIVERY_AGENCY_FEE, get_recommended_price, parse_exchange_rate,
};
pub use sanitize::{SanitizableValue, sanitize, sanitize_to_json, sanitize_with_max_depth};
pub use traits::SettingsStore;
pub use types::{
    CNY_CURRENCY_KEY, CompetitionQuery, CompetitionResponse, CurrencyQuote, ErrorDetail,
    ErrorResponse, HealthResponse, HealthStatus, ParseNumberRequest, ParseNumberResponse,
    RateSource, RecommendPriceRequest, RecommendPriceResponse, Setting, UpsertSettingRequest,
};
