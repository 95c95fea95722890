use crate::action::{ActionBehavior, ActionError, ClientContext, Conclusion, ServerContext};

/// Plays an animation and is done.
#[derive(Debug, Default)]
pub struct Emote;

impl ActionBehavior for Emote {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Stop)
    }

    fn start_client(&mut self, _ctx: &mut ClientContext<'_>) -> Conclusion {
        Conclusion::Stop
    }
}
