// Stored records and weather readings
pub mod observation;

// History windows and forecast outcomes
pub mod forecast;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
