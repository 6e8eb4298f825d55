pub mod client;
pub mod endpoints;
pub mod ticket;

pub use client::{HttpRpcClient, RpcClient, RpcResponse};
pub use endpoints::{
    TaskOutput, get_cur166_calculation, get_cur166_report, get_impact_force_calculation,
    get_impact_force_report, get_prepal_calculation, get_prepal_report, run_task,
};
pub use ticket::{Backoff, PollConfig, Ticket, TicketRecord, TicketState, wait_until_ticket_is_ready};
