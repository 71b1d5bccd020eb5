/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # ctfix Messages
//!
//! Outgoing message variants. Each variant implements
//! [`RequestMessage`](ctfix_core::RequestMessage): it supplies its type code
//! and ordered body fields, and the shared builder does the rest.
//!
//! - **Admin**: [`Logon`], [`Heartbeat`], [`TestRequest`], [`Logout`]
//! - **Trading**: [`NewOrderSingle`], [`OrderCancelRequest`], [`RequestForPositions`]
//! - **Market data**: [`MarketDataRequest`], [`SecurityListRequest`]

pub mod admin;
pub mod market_data;
pub mod trading;

pub use admin::{Heartbeat, Logon, Logout, TestRequest, generate_test_req_id};
pub use market_data::{MarketDataRequest, SecurityListRequest};
pub use trading::{NewOrderSingle, OrderCancelRequest, RequestForPositions};
