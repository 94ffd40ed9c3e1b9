//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities mirror the marketplace tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod charity;
pub mod delivery_request;
pub mod enums;
pub mod factory;
pub mod factory_request;
pub mod food_ticket;
pub mod hotel;
pub mod money_donation;
pub mod preference;
pub mod promo_code;
pub mod session;
pub mod subscription;
pub mod user;

// Re-export specific types to avoid conflicts
pub use charity::{Column as CharityColumn, Entity as Charity, Model as CharityModel};
pub use delivery_request::{
    Column as DeliveryRequestColumn, Entity as DeliveryRequest, Model as DeliveryRequestModel,
};
pub use enums::{
    DeliveryStatus, FactoryRequestStatus, OrganizationKind, Role, SubscriptionStatus, TicketKind,
    TicketStatus,
};
pub use factory::{Column as FactoryColumn, Entity as Factory, Model as FactoryModel};
pub use factory_request::{
    Column as FactoryRequestColumn, Entity as FactoryRequest, Model as FactoryRequestModel,
};
pub use food_ticket::{Column as FoodTicketColumn, Entity as FoodTicket, Model as FoodTicketModel};
pub use hotel::{Column as HotelColumn, Entity as Hotel, Model as HotelModel};
pub use money_donation::{
    Column as MoneyDonationColumn, Entity as MoneyDonation, Model as MoneyDonationModel,
};
pub use preference::{Column as PreferenceColumn, Entity as Preference, Model as PreferenceModel};
pub use promo_code::{Column as PromoCodeColumn, Entity as PromoCode, Model as PromoCodeModel};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use subscription::{
    Column as SubscriptionColumn, Entity as Subscription, Model as SubscriptionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
