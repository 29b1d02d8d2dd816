pub mod db;
pub mod models;
pub mod offers;
pub mod service;
