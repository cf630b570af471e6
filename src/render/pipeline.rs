use rand::Rng;

use crate::compile::layout::{TicketLayout, compose_ticket};
use crate::compile::plan::TicketPlan;
use crate::foundation::error::TicketResult;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::ticket::state::TicketState;

/// A painted ticket together with the plan it was painted from.
#[derive(Clone, Debug)]
pub struct RenderedTicket {
    pub plan: TicketPlan,
    pub frame: FrameRGBA,
}

/// Compose and rasterize one ticket frame.
pub fn render_ticket<R: Rng + ?Sized>(
    backend: &mut dyn RenderBackend,
    state: &TicketState,
    layout: &TicketLayout,
    rng: &mut R,
) -> TicketResult<RenderedTicket> {
    let plan = compose_ticket(state, layout, rng);
    let frame = backend.render_plan(&plan)?;
    Ok(RenderedTicket { plan, frame })
}
