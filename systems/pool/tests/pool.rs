use blockgrid_core::{BlockColor, BlockKind, Occupant};
use blockgrid_system_pool::{
    Config, ObjectPool, PoolError, DEFAULT_EXPAND_BY, DEFAULT_INITIAL_SIZE,
};
use glam::Vec3;

#[test]
fn default_pool_is_warmed_up() {
    let pool = ObjectPool::default();

    assert_eq!(pool.capacity(), DEFAULT_INITIAL_SIZE);
    assert_eq!(pool.available(), DEFAULT_INITIAL_SIZE);
    assert_eq!(pool.checked_out(), 0);
    assert_eq!(pool.expansions(), 0);
}

#[test]
fn release_of_acquire_restores_available_count() {
    let mut pool = ObjectPool::new(Config::new(4, 2));
    let before = pool.available();

    let handle = pool.acquire().expect("acquire");
    assert_eq!(pool.available(), before - 1);
    assert_eq!(pool.checked_out(), 1);
    assert!(pool.get(&handle).is_active());

    pool.release(handle);
    assert_eq!(pool.available(), before);
    assert_eq!(pool.checked_out(), 0);
    assert_eq!(pool.active_objects().count(), 0);
}

#[test]
fn acquiring_past_available_expands_exactly_once() {
    let initial = 3;
    let mut pool = ObjectPool::new(Config::new(initial, DEFAULT_EXPAND_BY));

    let handles: Vec<_> = (0..=initial)
        .map(|_| pool.acquire().expect("acquire"))
        .collect();

    assert_eq!(pool.expansions(), 1, "one expansion covers the shortfall");
    assert_eq!(pool.capacity(), initial + DEFAULT_EXPAND_BY);
    assert_eq!(pool.available(), DEFAULT_EXPAND_BY - 1);
    assert_eq!(pool.checked_out(), initial + 1);

    for handle in handles {
        pool.release(handle);
    }
    assert_eq!(pool.available(), pool.capacity());
}

#[test]
fn empty_pool_grows_on_first_acquire() {
    let mut pool = ObjectPool::new(Config::new(0, 5));

    let handle = pool.acquire().expect("acquire never fails without a cap");

    assert_eq!(pool.capacity(), 5);
    assert_eq!(pool.available(), 4);
    pool.release(handle);
}

#[test]
fn sustained_demand_grows_without_bound() {
    let mut pool = ObjectPool::new(Config::new(2, 3));

    let handles: Vec<_> = (0..50).map(|_| pool.acquire().expect("acquire")).collect();

    assert_eq!(pool.checked_out(), 50);
    assert!(pool.capacity() >= 50);
    for handle in handles {
        pool.release(handle);
    }
}

#[test]
fn capped_pool_reports_exhaustion() {
    let mut pool = ObjectPool::new(Config::new(2, 10).with_max_size(3));

    let first = pool.acquire().expect("warm object");
    let second = pool.acquire().expect("warm object");
    let third = pool.acquire().expect("partial expansion up to the cap");
    assert_eq!(pool.capacity(), 3);

    assert_eq!(pool.acquire(), Err(PoolError::Exhausted { capacity: 3 }));

    pool.release(first);
    let reused = pool.acquire().expect("released object is reusable");
    for handle in [second, third, reused] {
        pool.release(handle);
    }
}

#[test]
fn placed_objects_expose_block_presentation() {
    let mut pool = ObjectPool::new(Config::new(2, 1));
    let handle = pool.acquire().expect("acquire");

    pool.get_mut(&handle).place(
        Vec3::new(2.0, 0.0, 7.0),
        Occupant::new(BlockColor::YELLOW, BlockKind::Obstacle),
    );

    let object = pool.get(&handle);
    assert_eq!(object.position(), Vec3::new(2.0, 0.0, 7.0));
    assert_eq!(object.color(), Some(BlockColor::YELLOW));
    assert_eq!(object.tag(), Some("Obstacle"));
    assert!(object.is_solid());
    pool.release(handle);
}
