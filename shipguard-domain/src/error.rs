use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("shipment must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("malformed shipment: {0}")]
    MalformedShipment(String),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}
