// src/models/mod.rs

pub mod candidate;
pub mod exam_record;
pub mod question;
