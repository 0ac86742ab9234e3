//! Drive an overlay mixer for a few seconds of simulated frames and print one
//! JSON line per sampled frame.
//!
//! Run with `RUST_LOG=debug` to see lifecycle logging.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use serde_json::json;

use layermix_mixer_core::{
    AnimationTarget, BaseLayerSpec, ClipRef, MixerConfig, OverlayAnimationMixer,
};
use layermix_test_fixtures::{base_layers, clips, configs};

const DT: f32 = 1.0 / 30.0;

fn main() -> Result<()> {
    env_logger::init();

    let base: BaseLayerSpec = base_layers::load("locomotion")?;
    let config = MixerConfig::from_json(&configs::json("default")?)?;
    let wave: ClipRef = clips::load("wave")?;
    let jump: ClipRef = clips::load("jump")?;

    let mut mixer = OverlayAnimationMixer::new(&AnimationTarget::new("hero"), &base, config)?;
    let finished = Rc::new(Cell::new(0u32));
    {
        let finished = finished.clone();
        mixer.on_one_shot_finished(move || finished.set(finished.get() + 1));
    }

    mixer.play_one_shot(&wave)?;
    for frame in 0..120u32 {
        match frame {
            // Cut the wave short with a jump while it is holding.
            30 => mixer.play_one_shot(&jump)?,
            75 => mixer.set_base_state("walk")?,
            _ => {}
        }
        let sample = mixer.tick(DT)?;
        if frame % 5 == 0 {
            let line = json!({
                "frame": frame,
                "phase": mixer.phase(),
                "weights": mixer.weights(),
                "sample": sample,
                "finished": finished.get(),
            });
            println!("{line}");
        }
    }

    mixer.destroy();
    Ok(())
}
