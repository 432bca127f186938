// strider-core: errors, config, fixed-step time and the scene interface for Strider.
//
// Everything Bevy-facing (system sets, the core plugin, resource derives) is
// behind the `bevy` feature so the IK and controller math build without it.

pub mod config;
pub mod error;
pub mod time;
pub mod traits;

#[cfg(feature = "bevy")]
use bevy::prelude::*;

#[cfg(feature = "bevy")]
use crate::config::SimConfig;
#[cfg(feature = "bevy")]
use crate::time::SimTime;

// ---------------------------------------------------------------------------
// StriderSet
// ---------------------------------------------------------------------------

/// System ordering for one controller tick.
///
/// Body filters must run before any leg is evaluated, and transforms are only
/// written once every leg has been solved, so the three phases are chained.
#[cfg(feature = "bevy")]
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum StriderSet {
    /// Drain input commands into the current target/cursor.
    Input,
    /// Advance the locomotion controller by one fixed tick.
    Control,
    /// Write the resulting pose into scene transforms.
    Emit,
}

// ---------------------------------------------------------------------------
// StriderCorePlugin
// ---------------------------------------------------------------------------

/// Configures [`StriderSet`] ordering and the shared time resources.
///
/// Each `app.update()` is one fixed tick of [`SimConfig::tick_dt`] seconds;
/// hosts that render at a variable rate drive updates from a
/// [`TickClock`](time::TickClock).
#[cfg(feature = "bevy")]
pub struct StriderCorePlugin;

#[cfg(feature = "bevy")]
impl Plugin for StriderCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimConfig>()
            .init_resource::<SimTime>()
            .configure_sets(
                Update,
                (StriderSet::Input, StriderSet::Control, StriderSet::Emit).chain(),
            )
            .add_systems(Update, advance_sim_time.after(StriderSet::Emit));
    }
}

#[cfg(feature = "bevy")]
#[allow(clippy::needless_pass_by_value)]
fn advance_sim_time(config: Res<SimConfig>, mut time: ResMut<SimTime>) {
    time.tick_secs(config.tick_dt);
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::config::SimConfig;
    pub use crate::error::{CommandError, ConfigError, StriderError};
    pub use crate::time::{SimTime, TickClock};
    pub use crate::traits::{NodeId, Scene};
    #[cfg(feature = "bevy")]
    pub use crate::{StriderCorePlugin, StriderSet};
}

#[cfg(all(test, feature = "bevy"))]
mod tests {
    use super::*;

    #[test]
    fn plugin_inserts_resources() {
        let mut app = App::new();
        app.add_plugins(StriderCorePlugin);
        app.finish();
        app.cleanup();

        assert!(app.world().get_resource::<SimConfig>().is_some());
        assert!(app.world().get_resource::<SimTime>().is_some());
    }

    #[test]
    fn each_update_is_one_tick() {
        let mut app = App::new();
        app.add_plugins(StriderCorePlugin);
        app.finish();
        app.cleanup();

        for _ in 0..5 {
            app.update();
        }
        let time = app.world().resource::<SimTime>();
        assert_eq!(time.ticks(), 5);
    }
}
