pub mod audit_record;
pub mod change_set;
pub mod entity;
pub mod lifecycle;
