pub mod db_utils;
pub mod shift_time;
