//! 变更检测：宿主显式触发的同步更新

use super::template::render_segments;
use super::{Result, ViewEngine, ViewId};

impl ViewEngine {
    /// Runs one update pass over `view` and everything nested in it.
    ///
    /// Refreshes text bindings from the context and creates or removes the
    /// views of conditional containers. Works on unattached views too; the
    /// root list of the view is never touched.
    pub fn detect_changes(&mut self, view: ViewId) -> Result<()> {
        let instance = self.live_view(view)?;
        let context = instance.context.clone();
        let bindings = instance.bindings.clone();
        let mut embeds = instance.embeds.clone();

        for binding in &bindings {
            let text = render_segments(&binding.segments, &context);
            self.tree.set_text(binding.node, text)?;
        }

        for state in &mut embeds {
            let active = state.embed.when.evaluate(&context);
            if state.active == Some(active) {
                continue;
            }
            self.clear(state.container)?;
            if let Some(template) = state.embed.branch(active) {
                self.create_embedded_view(state.container, template, context.clone(), None)?;
            }
            tracing::debug!(?view, container = ?state.container, active, "embed switched");
            state.active = Some(active);
        }

        if let Some(instance) = self.views.get_mut(view) {
            instance.embeds = embeds;
        }

        let instance = self.live_view(view)?;
        let mut nested = Vec::new();
        for &container in &instance.containers {
            if let Some(c) = self.containers.get(container) {
                nested.extend(c.views.iter().copied());
            }
        }
        for &slot in &instance.slots {
            if let Some(content) = self.slots.get(slot).and_then(|s| s.content) {
                nested.push(content);
            }
        }

        for child in nested {
            self.detect_changes(child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/detect.rs"]
mod tests;
