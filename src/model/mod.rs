pub mod attendance;
pub mod custody;
pub mod document;
pub mod employee;
pub mod expiry;
pub mod leave;
pub mod payment;
pub mod payroll;
