pub mod admission;
pub mod device;
pub mod error;
pub mod geofence;
pub mod ledger;
