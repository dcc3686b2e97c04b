//! Services for forecasting, article generation and delivery

pub mod articles;
pub mod chatbot;
pub mod dispatcher;
pub mod document_store;
pub mod forecast;
pub mod i18n;
pub mod notifier;
pub mod places;
pub mod recipients;
pub mod targeting;
pub mod writer;

pub use articles::{ArticleBuilder, GenerationSummary};
pub use chatbot::ChatbotService;
pub use dispatcher::{DeliveryPolicy, Dispatcher};
pub use forecast::ForecastService;
pub use notifier::OperatorNotifier;
pub use places::{PgPlaceDirectory, PlaceDirectory};
pub use recipients::{PgRecipientDirectory, RecipientDirectory};
