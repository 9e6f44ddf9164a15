#![allow(dead_code)]

pub mod salarycast_env;
pub mod stub_service;
