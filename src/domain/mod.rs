mod email_address;
mod person_name;
mod phone_number;
mod request_status;
mod role;
mod rut;

pub use email_address::EmailAddress;
pub use person_name::PersonName;
pub use phone_number::PhoneNumber;
pub use request_status::RequestStatus;
pub use role::Role;
pub use rut::Rut;
