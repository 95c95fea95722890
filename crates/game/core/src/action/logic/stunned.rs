use crate::action::{
    ActionBehavior, ActionError, BuffableValue, Conclusion, InstanceView, ServerContext,
};

/// Helpless state; damage received is multiplied by the config's amount.
#[derive(Debug, Default)]
pub struct Stunned;

impl ActionBehavior for Stunned {
    fn start(&mut self, ctx: &mut ServerContext<'_>) -> Result<Conclusion, ActionError> {
        let config = ctx.config;
        ctx.set_trigger(&config.anim);
        Ok(Conclusion::Continue)
    }

    fn buff_value(&self, kind: BuffableValue, view: &InstanceView<'_>) -> Option<f32> {
        (kind == BuffableValue::PercentDamageReceived).then_some(view.config.amount)
    }

    fn cancel(&mut self, ctx: &mut ServerContext<'_>) {
        let config = ctx.config;
        ctx.set_trigger(&config.anim2);
    }
}
