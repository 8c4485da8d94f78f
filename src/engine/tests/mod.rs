mod common;

mod deal;
mod router;
