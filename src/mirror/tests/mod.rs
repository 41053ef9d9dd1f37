#![allow(clippy::unwrap_used)]

mod channel;
