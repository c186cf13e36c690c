//! # Engine State Module
//!
//! The core engine module that owns one play session of one world.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `voxels` - Noise, terrain generation and the world store
//! * `sync` - The mutation sync channel and the remote store contract
//! * `physics` - Player movement and collision
//! * `interaction` - Block picking, breaking and placing
//! * `camera_state` - Mouse look and the camera transform
//! * `render` - The deltas and camera handed to the renderer
//!
//! ## Frame
//!
//! One call to `EngineState::frame` runs, in order:
//! 1. the mutation sync channel drains its queue into the world store
//! 2. mouse look and a physics step, unless the session is paused
//! 3. a pending break or place, unless the session is paused
//! 4. render submission: the store's deltas and the camera transform
//!
//! The store is owned here and lent to each component, mutably only to the sync channel.
//! Remote store subscriptions may deliver from other threads; they only ever push onto
//! the sync channel's queue, so every store change still happens inside step 1.

pub mod camera_state;
pub mod frame_clock;
pub mod interaction;
pub mod physics;
pub mod render;
pub mod sync;
pub mod voxels;

use cgmath::Point3;
use log::{info, warn};
use web_time::Duration;
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::application_state::input_state::ProcessedInputState;
use crate::config::EngineConfig;
use crate::error::EngineError;
use camera_state::CameraState;
use frame_clock::FrameClock;
use interaction::raycast::RayHit;
use interaction::InteractionResolver;
use physics::{MovementInput, PlayerBody};
use render::RenderSink;
use sync::remote::{RemoteCommand, RemoteStore};
use sync::{MutationSync, SyncStats};
use voxels::block::block_type::BlockType;
use voxels::terrain::{TerrainGenerator, WorldDescriptor, WorldExtent};
use voxels::world::World;

/// Flags controlling whether the simulation advances.
#[derive(Debug, Default)]
pub struct EngineFlags {
    /// Whether the session has started and not been stopped
    pub running: bool,
    /// Whether the session is paused
    pub paused: bool,
}

/// Represents player actions derived from input for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerAction {
    /// Movement keys, true if pressed or held
    pub movement: MovementInput,
    /// View rotation, Some if the mouse moved
    pub rotate_view: Option<(f64, f64)>,
    /// Break the targeted block, on left button press
    pub break_block: bool,
    /// Place against the targeted block, on right button press
    pub place_block: bool,
}

/// What one frame did, for the HUD and for callers that want to observe the session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// The player's eye position rounded to whole world units
    pub hud_position: [i32; 3],
    pub sync: SyncStats,
    pub respawned: bool,
}

/// The main state container for the voxel engine
///
/// This struct owns the world store and every component that reads or changes it, and
/// runs them in a fixed order once per frame.
pub struct EngineState {
    /// Camera state managing orientation and mouse look
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// The voxel world store
    world: World,
    /// The player's simulated body
    body: PlayerBody,
    /// Applies remote mutations to `world`
    sync: MutationSync,
    /// Turns break and place intents into remote writes
    resolver: InteractionResolver,
    /// The shared mutation log
    remote: Box<dyn RemoteStore>,
    /// Identifier of this world's mutation collection in `remote`
    world_id: String,
    /// The block type placed by a place action
    selected_block: BlockType,
    config: EngineConfig,
    clock: FrameClock,
    /// Engine configuration flags
    flags: EngineFlags,
}

impl EngineState {
    /// Creates a new engine state for one world and starts the session.
    ///
    /// # Arguments
    ///
    /// * `descriptor` - Seed and world type of the world to generate
    /// * `world_id` - The world's mutation collection in `remote`
    /// * `remote` - The shared mutation log
    /// * `config` - Engine tunables
    ///
    /// # Returns
    ///
    /// The engine, with terrain generated and the mutation sync channel subscribed, or the
    /// error raised by validating `config` or by the subscription.
    pub fn new(
        descriptor: WorldDescriptor,
        world_id: impl Into<String>,
        remote: Box<dyn RemoteStore>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let world_id = world_id.into();

        let layer = TerrainGenerator::new(&descriptor)
            .generate(WorldExtent::new(config.world_half_extent));
        let mut world = World::new(descriptor);
        world.populate(&layer);

        let mut sync = MutationSync::new(layer, config.retraction);
        sync.connect(remote.as_ref(), &world_id)?;

        let body = PlayerBody::new(Point3::from(config.spawn_point))
            .with_respawn_point(Point3::from(config.respawn_point));
        let camera_state = CameraState::new(body.position, config.sensitivity);
        let max_frame_delta = Duration::try_from_secs_f32(config.max_frame_delta)
            .unwrap_or(Duration::from_millis(100));
        let clock = FrameClock::new(max_frame_delta);

        info!(
            "Started world {} ({:?}, seed {}) with {} natural blocks",
            world_id,
            descriptor.world_type,
            descriptor.seed,
            world.len()
        );

        Ok(Self {
            camera_state,
            player_actions: PlayerAction::default(),
            world,
            body,
            sync,
            resolver: InteractionResolver::new(config.pick_range),
            remote,
            world_id,
            selected_block: BlockType::GRASS,
            config,
            clock,
            flags: EngineFlags {
                running: true,
                paused: false,
            },
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world_id(&self) -> &str {
        &self.world_id
    }

    pub fn selected_block(&self) -> BlockType {
        self.selected_block
    }

    /// Chooses the block type placed by later place actions.
    pub fn set_selected_block(&mut self, block_type: BlockType) {
        self.selected_block = block_type;
    }

    /// Sets the radians of camera rotation per pixel of mouse movement.
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.camera_state.set_sensitivity(sensitivity);
    }

    pub fn is_running(&self) -> bool {
        self.flags.running
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused
    }

    /// Whether frames currently advance the simulation.
    pub fn is_active(&self) -> bool {
        self.flags.running && !self.flags.paused
    }

    pub fn set_running(&mut self, running: bool) {
        self.flags.running = running;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.flags.paused != paused {
            info!("Session {}", if paused { "paused" } else { "resumed" });
        }
        self.flags.paused = paused;
    }

    /// Sets the input commands for the next frame.
    ///
    /// # Arguments
    /// * `input` - The processed input state to use for setting commands
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = Self::translate_processed_input(&input);
    }

    /// Translates the processed input state into player actions.
    ///
    /// # Arguments
    /// * `input` - The processed input state to translate
    ///
    /// # Returns
    /// A PlayerAction struct with the appropriate actions set
    pub fn translate_processed_input(input: &ProcessedInputState) -> PlayerAction {
        PlayerAction {
            movement: MovementInput {
                forward: input.get_key_state(KeyCode::KeyW).is_active(),
                backward: input.get_key_state(KeyCode::KeyS).is_active(),
                left: input.get_key_state(KeyCode::KeyA).is_active(),
                right: input.get_key_state(KeyCode::KeyD).is_active(),
                jump: input.get_key_state(KeyCode::Space).is_active(),
            },
            rotate_view: input.get_mouse_delta(),
            break_block: input.get_mouse_button_state(MouseButton::Left).is_just_pressed(),
            place_block: input.get_mouse_button_state(MouseButton::Right).is_just_pressed(),
        }
    }

    /// Runs one frame, timed by the engine's own clock.
    pub fn frame(&mut self, renderer: &mut dyn RenderSink) -> FrameReport {
        let dt = self.clock.tick();
        self.advance(dt, renderer)
    }

    /// Runs one frame of length `dt`.
    ///
    /// While the session is paused, remote mutations are still applied and rendered, but
    /// input is discarded and the player does not move. Once the session is shut down the
    /// world no longer changes.
    pub fn advance(&mut self, dt: Duration, renderer: &mut dyn RenderSink) -> FrameReport {
        let sync = self.sync_now();
        let actions = std::mem::take(&mut self.player_actions);
        let mut respawned = false;

        if self.is_active() {
            self.camera_state.intake_look(actions.rotate_view);

            let dt = self.clock.clamp(dt).as_secs_f32();
            let basis = self.camera_state.horizontal_basis();
            let step = self.body.step(
                dt,
                &actions.movement,
                &basis,
                &self.world,
                &self.config.physics,
            );
            respawned = step.respawned;
            self.camera_state.follow(self.body.position);

            if actions.break_block {
                self.break_targeted();
            } else if actions.place_block {
                self.place_targeted();
            }
        } else {
            self.clock.reset();
        }

        renderer.apply_voxel_deltas(&self.world.take_deltas());
        renderer.set_camera(&self.camera_state.transform());

        let position = self.body.position;
        FrameReport {
            hud_position: [
                position.x.round() as i32,
                position.y.round() as i32,
                position.z.round() as i32,
            ],
            sync,
            respawned,
        }
    }

    /// Applies queued remote mutations now, outside of a frame. Does nothing after
    /// `shutdown`.
    pub fn sync_now(&mut self) -> SyncStats {
        if !self.flags.running {
            return SyncStats::default();
        }
        self.sync.apply_pending(&mut self.world)
    }

    /// The block under the crosshair, if one is within pick range.
    pub fn targeted_block(&self) -> Option<RayHit> {
        let camera = &self.camera_state.camera;
        self.resolver
            .pick(&self.world, camera.position, camera.get_view_vec())
    }

    /// Breaks the block under the crosshair.
    ///
    /// # Returns
    /// The write sent to the remote store, or `None` if nothing was targeted.
    pub fn break_targeted(&mut self) -> Option<RemoteCommand> {
        let hit = self.targeted_block()?;
        let command = self.resolver.break_block(&hit);
        self.issue(&command);
        Some(command)
    }

    /// Places the selected block against the face under the crosshair.
    ///
    /// # Returns
    /// The write sent to the remote store, or `None` if nothing was targeted or the block
    /// would overlap the player.
    pub fn place_targeted(&mut self) -> Option<RemoteCommand> {
        let hit = self.targeted_block()?;
        let player = self.body.bounding_box(&self.config.physics);
        let command = self
            .resolver
            .place_block(&hit, self.selected_block, &player)?;
        self.issue(&command);
        Some(command)
    }

    /// Sends `command` to the remote store without waiting for its echo.
    fn issue(&self, command: &RemoteCommand) {
        if let Err(e) = command.dispatch(self.remote.as_ref(), &self.world_id) {
            warn!("Remote write for record {} failed: {}", command.id(), e);
        }
    }

    /// Ends the session: unsubscribes from the remote store, drops mutations that arrived
    /// but were not yet applied, and stops the simulation.
    pub fn shutdown(&mut self) {
        if self.flags.running {
            info!("Shutting down world {}", self.world_id);
        }
        self.sync.disconnect();
        self.sync.discard_pending();
        self.flags.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_state::input_state::RawInputState;
    use crate::engine_state::render::HeadlessRenderSink;
    use crate::engine_state::sync::memory_store::InMemoryRemoteStore;
    use crate::engine_state::voxels::coords::VoxelCoord;
    use crate::engine_state::voxels::terrain::WorldType;
    use std::collections::HashMap;

    const WORLD: &str = "worlds/flat";
    const FRAME: Duration = Duration::from_millis(16);

    fn flat_engine(store: &InMemoryRemoteStore) -> EngineState {
        let config = EngineConfig {
            world_half_extent: 4,
            spawn_point: [0.0, 30.0, 0.0],
            ..EngineConfig::default()
        };
        EngineState::new(
            WorldDescriptor {
                seed: 7,
                world_type: WorldType::SUPERFLAT,
            },
            WORLD,
            Box::new(store.clone()),
            config,
        )
        .expect("engine should start")
    }

    fn settle(engine: &mut EngineState, sink: &mut HeadlessRenderSink) {
        for _ in 0..120 {
            engine.advance(FRAME, sink);
        }
    }

    fn look_straight_down(engine: &mut EngineState) {
        engine.camera_state.intake_look(Some((0.0, 100_000.0)));
    }

    #[test]
    fn first_frame_submits_the_whole_natural_layer() {
        let store = InMemoryRemoteStore::new();
        let mut engine = flat_engine(&store);
        let mut sink = HeadlessRenderSink::default();

        engine.advance(FRAME, &mut sink);

        assert_eq!(sink.visible.len(), engine.world().len());
        assert_eq!(sink.visible.len(), 8 * 8 * 4);
        assert!(sink.camera.is_some());
    }

    #[test]
    fn player_lands_on_the_surface() {
        let store = InMemoryRemoteStore::new();
        let mut engine = flat_engine(&store);
        let mut sink = HeadlessRenderSink::default();

        settle(&mut engine, &mut sink);

        assert!(engine.body().grounded);
        let report = engine.advance(FRAME, &mut sink);
        assert_eq!(report.hud_position, [0, 23, 0]);
    }

    #[test]
    fn breaking_takes_effect_only_through_the_echo() {
        let store = InMemoryRemoteStore::new();
        let mut engine = flat_engine(&store);
        let mut sink = HeadlessRenderSink::default();
        settle(&mut engine, &mut sink);
        look_straight_down(&mut engine);

        let command = engine.break_targeted().expect("grass should be targeted");

        let grass = VoxelCoord::new(0, 0, 0);
        assert_eq!(command.id(), &grass.record_key());
        assert!(engine.world().is_occupied(grass));
        assert_eq!(store.record_count(WORLD), 1);

        let report = engine.advance(FRAME, &mut sink);
        assert_eq!(report.sync.applied, 1);
        assert!(!engine.world().is_occupied(grass));
        assert!(!sink.visible.contains_key(&grass));
    }

    #[test]
    fn placing_under_the_player_is_rejected() {
        let store = InMemoryRemoteStore::new();
        let mut engine = flat_engine(&store);
        let mut sink = HeadlessRenderSink::default();
        settle(&mut engine, &mut sink);
        look_straight_down(&mut engine);

        assert_eq!(engine.place_targeted(), None);
        assert_eq!(store.record_count(WORLD), 0);
    }

    #[test]
    fn failed_writes_do_not_stop_the_session() {
        let store = InMemoryRemoteStore::new();
        let mut engine = flat_engine(&store);
        let mut sink = HeadlessRenderSink::default();
        settle(&mut engine, &mut sink);
        look_straight_down(&mut engine);
        store.set_available(false);

        assert!(engine.break_targeted().is_some());
        engine.player_actions.movement.forward = true;
        let before = engine.body().position;
        engine.advance(FRAME, &mut sink);

        assert!(engine.world().is_occupied(VoxelCoord::new(0, 0, 0)));
        assert_ne!(engine.body().position, before);
    }

    #[test]
    fn paused_sessions_still_sync_but_do_not_move() {
        let store = InMemoryRemoteStore::new();
        let mut engine = flat_engine(&store);
        let mut sink = HeadlessRenderSink::default();
        engine.set_paused(true);
        let start = engine.body().position;

        let tower = VoxelCoord::new(3, 1, 3);
        let record = sync::MutationRecord::placement(tower, BlockType::BRICK);
        store
            .write(WORLD, &tower.record_key(), record.to_value().expect("records encode"))
            .expect("write should succeed");
        engine.player_actions.movement.forward = true;
        engine.advance(FRAME, &mut sink);

        assert_eq!(engine.body().position, start);
        assert_eq!(sink.visible.get(&tower), Some(&BlockType::BRICK));
        assert_eq!(engine.player_actions, PlayerAction::default());
    }

    #[test]
    fn input_translation_uses_presses_for_actions() {
        let input = ProcessedInputState {
            keyboard_states: HashMap::from([
                (KeyCode::KeyW, RawInputState::Held),
                (KeyCode::Space, RawInputState::Pressed),
                (KeyCode::KeyS, RawInputState::Released),
            ]),
            mouse_button_states: HashMap::from([
                (MouseButton::Left, RawInputState::Held),
                (MouseButton::Right, RawInputState::Pressed),
            ]),
            mouse_delta: Some((4.0, -2.0)),
        };

        let actions = EngineState::translate_processed_input(&input);

        assert!(actions.movement.forward);
        assert!(actions.movement.jump);
        assert!(!actions.movement.backward);
        assert!(!actions.break_block);
        assert!(actions.place_block);
        assert_eq!(actions.rotate_view, Some((4.0, -2.0)));
    }

    #[test]
    fn a_tap_between_frames_still_breaks() {
        let mut manager = crate::application_state::input_manager::InputManager::new();
        manager.set_mouse_button(MouseButton::Left, true);
        manager.set_mouse_button(MouseButton::Left, false);

        let input = manager.get_and_reset_processed_input();
        let actions = EngineState::translate_processed_input(&input);

        assert!(actions.break_block);
        assert!(!actions.place_block);
    }

    #[test]
    fn mutations_queued_before_shutdown_are_not_applied() {
        let store = InMemoryRemoteStore::new();
        let mut engine = flat_engine(&store);
        let mut sink = HeadlessRenderSink::default();
        engine.advance(FRAME, &mut sink);

        let grass = VoxelCoord::new(0, 0, 0);
        let record = sync::MutationRecord::tombstone(grass);
        store
            .write(WORLD, &grass.record_key(), record.to_value().expect("records encode"))
            .expect("write should succeed");
        engine.shutdown();

        let report = engine.advance(FRAME, &mut sink);

        assert_eq!(report.sync, SyncStats::default());
        assert_eq!(engine.sync_now(), SyncStats::default());
        assert!(engine.world().is_occupied(grass));
        assert!(sink.visible.contains_key(&grass));
    }

    #[test]
    fn invalid_config_fails_startup() {
        let store = InMemoryRemoteStore::new();
        let config = EngineConfig {
            world_half_extent: -3,
            ..EngineConfig::default()
        };

        let result = EngineState::new(
            WorldDescriptor {
                seed: 7,
                world_type: WorldType::SUPERFLAT,
            },
            WORLD,
            Box::new(store.clone()),
            config,
        );

        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
        assert_eq!(store.subscriber_count(WORLD), 0);
    }

    #[test]
    fn shutdown_unsubscribes() {
        let store = InMemoryRemoteStore::new();
        let mut engine = flat_engine(&store);
        assert_eq!(store.subscriber_count(WORLD), 1);

        engine.shutdown();

        assert_eq!(store.subscriber_count(WORLD), 0);
        assert!(!engine.is_running());
        assert!(!engine.is_active());
    }
}
