use thiserror::Error;

pub type Result<T> = std::result::Result<T, LotteryError>;

#[derive(Error, Debug)]
pub enum LotteryError {
    #[error("Cannot draw {requested} unique numbers from 1..={max}")]
    RangeTooSmall { requested: usize, max: u8 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
