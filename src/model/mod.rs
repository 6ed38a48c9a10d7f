pub mod attendance;
pub mod device_registration;
pub mod employee;
pub mod role;
