pub mod crud;
pub mod dashboard;
pub mod document;
pub mod expiry;
pub mod leave;
pub mod payroll;
pub mod shell;

#[cfg(test)]
pub mod testing;
