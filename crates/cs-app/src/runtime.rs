//! Setup runtime assembly.
//! 设置运行时的组装。
//!
//! One [`SetupRuntime`] exists per window. It owns the shared provisioning
//! context, the controller and the deduplicating runner, and hands out
//! placeholder agents that all funnel into the same runner.

use std::sync::Arc;

use cs_core::chat::{ChatLocation, ChatMode};
use cs_core::provisioning::ProvisioningState;

use crate::deps::AppDeps;
use crate::usecases::{
    ForwardingConfig, PlaceholderAgent, ProvisioningContext, SetupController, SetupRunner,
};

pub struct SetupRuntime {
    deps: AppDeps,
    context: Arc<ProvisioningContext>,
    controller: Arc<SetupController>,
    runner: SetupRunner,
}

impl SetupRuntime {
    pub fn from_deps(deps: AppDeps, initial: ProvisioningState) -> Self {
        let context = ProvisioningContext::new(initial).arc();
        let controller = Arc::new(SetupController::new(Arc::clone(&context), &deps));
        let runner = SetupRunner::new(Arc::clone(&context), Arc::clone(&controller), &deps);
        Self {
            deps,
            context,
            controller,
            runner,
        }
    }

    pub fn context(&self) -> &Arc<ProvisioningContext> {
        &self.context
    }

    pub fn controller(&self) -> &Arc<SetupController> {
        &self.controller
    }

    pub fn runner(&self) -> &SetupRunner {
        &self.runner
    }

    pub fn placeholder_agent(
        &self,
        location: ChatLocation,
        mode: Option<ChatMode>,
        config: ForwardingConfig,
    ) -> PlaceholderAgent {
        PlaceholderAgent::new(
            location,
            mode,
            Arc::clone(&self.context),
            self.runner.clone(),
            Arc::clone(&self.controller),
            &self.deps,
            config,
        )
    }
}
