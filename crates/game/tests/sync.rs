mod common;

use std::thread;
use std::time::{Duration, Instant};

use common::{FakeServer, loopback_config};
use glam::Vec2;
use verilandia::net::codec;
use verilandia::{
    Bullet, Channel, Identity, Move, Player, PlayerId, Shoot, Snapshot, SyncConfig,
    SyncController, SyncError,
};

fn connect(server: &FakeServer) -> SyncController {
    let config = SyncConfig {
        transport: loopback_config(),
        ..Default::default()
    };
    SyncController::connect(server.addr(), config).unwrap()
}

fn send_snapshot(
    server: &FakeServer,
    controller: &SyncController,
    local_id: PlayerId,
    players: &[Player],
    bullets: &[Bullet],
) {
    let frame = codec::make_message(local_id, &Snapshot::from_entities(players, bullets));
    server.send(controller.local_addr(), Channel::Update.tag(), &frame);
}

fn poll_until(
    controller: &mut SyncController,
    timeout_ms: u64,
    mut done: impl FnMut(&SyncController) -> bool,
) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        controller.poll();
        if done(controller) {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

fn identify(server: &FakeServer, controller: &mut SyncController, id: PlayerId, pos: Vec2) {
    send_snapshot(server, controller, id, &[Player::new(id, pos, Vec2::ZERO)], &[]);
    assert!(poll_until(controller, 1000, |c| c.identity()
        == Identity::Identified(id)));
}

#[test]
fn test_snapshot_identifies_player() {
    let server = FakeServer::bind();
    let mut controller = connect(&server);
    assert_eq!(controller.identity(), Identity::Unidentified);
    assert_eq!(controller.player_id(), 0);

    identify(&server, &mut controller, 3, Vec2::new(5.0, 6.0));

    assert_eq!(controller.player_id(), 3);
    assert_eq!(controller.world().player().pos, Vec2::new(5.0, 6.0));
    assert!(controller.world().enemies().is_empty());
}

#[test]
fn test_shot_direction_and_wire_frame() {
    let server = FakeServer::bind();
    let mut controller = connect(&server);
    identify(&server, &mut controller, 3, Vec2::new(1.0, 1.0));

    let bullet = controller.shoot_at(Vec2::new(4.0, 5.0)).unwrap();
    assert!(bullet.pos.abs_diff_eq(Vec2::new(1.6, 1.8), 1e-5));
    assert!(bullet.velocity.abs_diff_eq(Vec2::new(18.0, 24.0), 1e-4));
    assert_eq!(bullet.shooter_id, 3);
    assert_eq!(controller.world().bullets(), &[bullet]);

    controller.poll();
    let (body, _) = server.recv_on(Channel::Shoot, 1000).expect("No packet received");
    let (header, shoot) = codec::decode::<Shoot>(&body).unwrap();
    assert_eq!(header.player_id, 3);
    assert_eq!(shoot.bullet, bullet);
}

#[test]
fn test_far_and_near_targets_still_fire() {
    let server = FakeServer::bind();
    let mut controller = connect(&server);
    identify(&server, &mut controller, 4, Vec2::ZERO);

    let far = controller.shoot_at(Vec2::new(1.0e20, 0.0)).unwrap();
    assert!(far.velocity.abs_diff_eq(Vec2::new(30.0, 0.0), 1e-4));

    let near = controller.shoot_at(Vec2::new(0.0, 1.0e-30)).unwrap();
    assert!(near.pos.abs_diff_eq(Vec2::new(0.0, 1.0), 1e-6));

    controller.poll();
    let shots = server.collect_on(Channel::Shoot, 150);
    assert_eq!(shots.len(), 2);
    let (_, shoot) = codec::decode::<Shoot>(&shots[0]).unwrap();
    assert_eq!(shoot.bullet, far);
    assert_eq!(controller.sync_stats().shots_rejected, 0);
}

#[test]
fn test_shooting_self_sends_nothing() {
    let server = FakeServer::bind();
    let mut controller = connect(&server);
    identify(&server, &mut controller, 2, Vec2::new(7.0, 7.0));

    assert!(matches!(
        controller.shoot_at(Vec2::new(7.0, 7.0)),
        Err(SyncError::CannotShootSelf)
    ));
    assert!(matches!(
        controller.shoot_at(Vec2::new(f32::NAN, 0.0)),
        Err(SyncError::InvalidTarget(_))
    ));

    controller.poll();
    assert!(server.collect_on(Channel::Shoot, 100).is_empty());
    assert!(controller.world().bullets().is_empty());
    assert_eq!(controller.sync_stats().shots_rejected, 2);
    assert_eq!(controller.pending_writes(), 0);
}

#[test]
fn test_move_sent_only_on_change() {
    let server = FakeServer::bind();
    let mut controller = connect(&server);
    identify(&server, &mut controller, 5, Vec2::ZERO);

    let right = Vec2::new(10.0, 0.0);
    assert!(controller.set_velocity(right).unwrap());
    assert!(!controller.set_velocity(right).unwrap());
    assert!(!controller.set_velocity(right).unwrap());
    assert_eq!(controller.last_sent_velocity(), Some(right));

    controller.poll();
    let moves = server.collect_on(Channel::Move, 150);
    assert_eq!(moves.len(), 1);
    let (header, intent) = codec::decode::<Move>(&moves[0]).unwrap();
    assert_eq!(header.player_id, 5);
    assert_eq!(intent.velocity, right);

    assert!(controller.set_velocity(Vec2::ZERO).unwrap());
    controller.poll();
    assert_eq!(server.collect_on(Channel::Move, 150).len(), 1);
    assert_eq!(controller.sync_stats().moves_sent, 2);
}

#[test]
fn test_reconciliation_ignores_entry_order() {
    let server = FakeServer::bind();
    let mut controller = connect(&server);

    let me = Player::new(1, Vec2::new(2.0, 2.0), Vec2::new(1.0, 0.0));
    let a = Player::new(4, Vec2::new(8.0, 0.0), Vec2::ZERO);
    let b = Player::new(6, Vec2::new(0.0, 8.0), Vec2::new(0.0, -1.0));
    let shot = Bullet::new(Vec2::new(3.0, 3.0), Vec2::new(30.0, 0.0), 4);

    send_snapshot(&server, &controller, 1, &[a, me, b], &[shot]);
    assert!(poll_until(&mut controller, 1000, |c| c
        .sync_stats()
        .snapshots_applied
        == 1));
    let mut first: Vec<Player> = controller.world().enemies().to_vec();
    first.sort_by_key(|p| p.id);

    send_snapshot(&server, &controller, 1, &[b, a, me], &[shot]);
    assert!(poll_until(&mut controller, 1000, |c| c
        .sync_stats()
        .snapshots_applied
        == 2));
    let mut second: Vec<Player> = controller.world().enemies().to_vec();
    second.sort_by_key(|p| p.id);

    assert_eq!(first, vec![a, b]);
    assert_eq!(first, second);
    assert_eq!(controller.world().player().pos, me.pos);
    assert_eq!(controller.world().bullets(), &[shot]);
}

#[test]
fn test_dead_reckoning_between_snapshots() {
    let server = FakeServer::bind();
    let mut controller = connect(&server);
    identify(&server, &mut controller, 1, Vec2::ZERO);
    controller.set_velocity(Vec2::new(10.0, 0.0)).unwrap();

    controller.integrate(0.5);
    assert!(controller
        .world()
        .player()
        .pos
        .abs_diff_eq(Vec2::new(5.0, 0.0), 1e-5));
}

#[test]
fn test_stray_datagrams_leave_world_untouched() {
    let server = FakeServer::bind();
    let mut controller = connect(&server);
    identify(&server, &mut controller, 2, Vec2::ONE);

    let client = controller.local_addr();
    server.send(client, 0x77, &[1, 2, 3, 4]);
    server.send(client, Channel::Update.tag(), &[0; 5]);
    let valid = codec::make_message(2, &Snapshot::from_entities(
        &[Player::new(2, Vec2::new(4.0, 4.0), Vec2::ZERO)],
        &[],
    ));
    server.send(client, Channel::Update.tag(), &valid);

    assert!(poll_until(&mut controller, 1000, |c| c
        .sync_stats()
        .snapshots_applied
        == 2));
    assert_eq!(controller.sync_stats().snapshots_rejected, 1);
    assert_eq!(controller.world().player().pos, Vec2::new(4.0, 4.0));
    assert_eq!(controller.identity(), Identity::Identified(2));
    assert!(controller.network_stats().datagrams_dropped >= 1);
}
