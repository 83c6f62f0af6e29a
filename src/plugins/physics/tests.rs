use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;

use crate::common::tunables::Tunables;

#[test]
fn fixed_clock_follows_tunables() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, AssetPlugin::default(), ScenePlugin));
    let mut tun = Tunables::default();
    tun.fixed_hz = 60.0;
    tun.max_frame_delta = 0.1;
    app.insert_resource(tun);

    super::plugin(&mut app);

    let fixed = app.world().resource::<Time<Fixed>>();
    assert_eq!(fixed.timestep(), Duration::from_secs_f64(1.0 / 60.0));
    let virt = app.world().resource::<Time<Virtual>>();
    assert_eq!(virt.max_delta(), Duration::from_secs_f32(0.1));
}
