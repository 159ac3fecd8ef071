#![allow(dead_code)]

pub mod recording_device;
pub mod test_utils;
