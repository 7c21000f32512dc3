//! End-to-end storage scenarios.

use std::cell::RefCell;
use std::rc::Rc;

use strata_ecs::component::{Component, ComponentBuffer, ComponentId};
use strata_ecs::entity::{Entity, EntityPool};
use strata_ecs::graph::NodeId;
use strata_ecs::query::{Batch, Filter};
use strata_ecs::relation::Relation;
use strata_ecs::storage::TableId;
use strata_ecs::world::{EventKind, World, WorldConfig};

#[derive(Default, Debug, Clone, PartialEq)]
struct A(i32);
impl Component for A {}

#[derive(Default, Debug, Clone, PartialEq)]
struct B(i32);
impl Component for B {}

#[derive(Default, Debug, Clone, PartialEq)]
struct Label(String);
impl Component for Label {}

#[derive(Default)]
struct ChildOf;
impl Component for ChildOf {
    const RELATION: bool = true;
}

fn sorted(mut tables: Vec<TableId>) -> Vec<TableId> {
    tables.sort_unstable();
    tables
}

#[test]
fn recycled_ids_never_alias() {
    let mut pool = EntityPool::new();
    let first = pool.get();
    pool.recycle(first).unwrap();

    let second = pool.get();
    let third = pool.get();
    assert_eq!(second.id(), first.id());
    assert_ne!(second, first);
    assert!(!pool.alive(first));
    assert!(pool.alive(second) && pool.alive(third));
    assert!(pool.recycle(first).is_err());
}

#[test]
fn exchange_keeps_values() {
    let mut world = World::new();

    let mut values = ComponentBuffer::new();
    values.push(&mut world, A(1)).unwrap();
    let e1 = world.new_entity_with(values, &[]).unwrap();
    let a = world.component_id::<A>().unwrap();

    let mut values = ComponentBuffer::new();
    values.push(&mut world, B(2)).unwrap();
    world.exchange_with(e1, values, &[], &[]).unwrap();
    assert_eq!(world.get::<A>(e1).unwrap(), Some(&A(1)));
    assert_eq!(world.get::<B>(e1).unwrap(), Some(&B(2)));

    world.exchange(e1, &[], &[a], &[]).unwrap();
    assert!(!world.has::<A>(e1).unwrap());
    assert_eq!(world.get::<B>(e1).unwrap(), Some(&B(2)));
}

#[test]
fn round_trip_reaches_the_starting_node() {
    let mut world = World::new();
    let a = world.register_component::<A>().unwrap();
    let b = world.register_component::<B>().unwrap();
    let label = world.register_component::<Label>().unwrap();

    let e = world.new_entity(&[a], &[]).unwrap();
    let start_mask = *world.mask_of(e).unwrap();
    let start_node = world.graph().find_mask(&start_mask).unwrap();
    let start_table = world.matching_tables(&Filter::new(&[a]).exclusive(), &[]).unwrap();

    world.exchange(e, &[b, label], &[a], &[]).unwrap();
    assert_ne!(world.mask_of(e).unwrap(), &start_mask);
    world.exchange(e, &[a], &[b, label], &[]).unwrap();

    assert_eq!(world.mask_of(e).unwrap(), &start_mask);
    assert_eq!(world.graph().find_mask(&start_mask), Some(start_node));
    assert_ne!(start_node, NodeId::ROOT);
    assert_eq!(world.matching_tables(&Filter::new(&[a]).exclusive(), &[]).unwrap(), start_table);
    assert_eq!(world.table(start_table[0]).unwrap().entities(), &[e]);
}

#[test]
fn swap_removal_updates_locations() {
    let mut world = World::new();
    let a = world.register_component::<A>().unwrap();
    let entities: Vec<Entity> = (0..5)
        .map(|i| {
            let e = world.new_entity(&[a], &[]).unwrap();
            world.set(e, A(i)).unwrap();
            e
        })
        .collect();

    world.remove_entity(entities[1]).unwrap();

    let filter = Filter::new(&[a]);
    let tables = world.matching_tables(&filter, &[]).unwrap();
    let table = world.table(tables[0]).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.entities()[1], entities[4]);
    assert_eq!(world.column::<A>(tables[0]).unwrap()[1], A(4));
    assert_eq!(world.get::<A>(entities[4]).unwrap(), Some(&A(4)));
    world.set(entities[4], A(40)).unwrap();
    assert_eq!(world.column::<A>(tables[0]).unwrap()[1], A(40));
}

#[test]
fn cache_matches_brute_force() {
    let mut world = World::with_config(WorldConfig::new().with_relation_capacity(2));
    let a = world.register_component::<A>().unwrap();
    let b = world.register_component::<B>().unwrap();
    let child_of = world.register_component::<ChildOf>().unwrap();

    let mut with_a = Filter::new(&[a]);
    let mut only_b = Filter::new(&[b]).exclusive();
    let mut children = Filter::new(&[child_of]);
    world.register_filter(&mut with_a, &[]).unwrap();
    world.register_filter(&mut only_b, &[]).unwrap();
    world.register_filter(&mut children, &[]).unwrap();

    let check = |world: &World| {
        for filter in [&with_a, &only_b, &children] {
            let brute: Vec<TableId> = world
                .archetypes()
                .iter()
                .filter(|arche| filter.matches(arche.mask()))
                .flat_map(|arche| arche.tables().iter().copied())
                .collect();
            let cached = world.cached_tables(filter.cache().unwrap()).unwrap().to_vec();
            assert_eq!(sorted(cached), sorted(brute));
        }
    };

    let mut parents = Vec::new();
    for i in 0..6 {
        let ids: &[ComponentId] = match i % 3 {
            0 => &[a],
            1 => &[b],
            _ => &[a, b],
        };
        parents.push(world.new_entity(ids, &[]).unwrap());
        check(&world);
    }
    for (i, &p) in parents.iter().enumerate() {
        let ids: &[ComponentId] = if i % 2 == 0 { &[child_of] } else { &[child_of, a] };
        world.new_entity(ids, &[Relation::new(child_of, p)]).unwrap();
        check(&world);
    }
    for &p in parents.iter().step_by(2) {
        world.remove_entity(p).unwrap();
        check(&world);
    }
    world.exchange_batch(&Batch::new(&with_a), &[], &[a], &[], None).unwrap();
    check(&world);

    world.reset().unwrap();
    check(&world);
    world.new_entity(&[b], &[]).unwrap();
    check(&world);
    assert_eq!(world.cached_tables(only_b.cache().unwrap()).unwrap().len(), 1);
}

#[test]
fn removing_a_parent_resets_ten_children() {
    let mut world = World::new();
    let a = world.register_component::<A>().unwrap();
    let label = world.register_component::<Label>().unwrap();
    let child_of = world.register_component::<ChildOf>().unwrap();

    let parent = world.new_entity(&[a], &[]).unwrap();
    let children: Vec<Entity> = (0..10)
        .map(|i| {
            let child = world
                .new_entity(&[a, label, child_of], &[Relation::new(child_of, parent)])
                .unwrap();
            world.set(child, A(i)).unwrap();
            world.set(child, Label(format!("child {i}"))).unwrap();
            child
        })
        .collect();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    world.set_listener(move |event| sink.borrow_mut().push(*event));

    world.remove_entity(parent).unwrap();
    assert!(!world.alive(parent));

    for (i, &child) in children.iter().enumerate() {
        assert!(world.alive(child));
        assert_eq!(world.get_relation(child, child_of).unwrap(), Entity::ZERO);
        assert_eq!(world.get::<A>(child).unwrap(), Some(&A(i as i32)));
        assert_eq!(world.get::<Label>(child).unwrap(), Some(&Label(format!("child {i}"))));
    }

    let events = events.borrow();
    assert_eq!(events.len(), 11);
    assert!(events[0].kind.contains(EventKind::ENTITY_REMOVED));
    assert!(events[1..].iter().all(|e| e.kind.contains(EventKind::TARGET_REMOVED) && e.relation_changed()));
    assert!(!world.is_locked());
}

#[test]
fn registered_filter_sees_batch_spawn() {
    let mut world = World::new();
    let a = world.register_component::<A>().unwrap();
    let b = world.register_component::<B>().unwrap();

    let mut filter = Filter::new(&[a, b]);
    let cache = world.register_filter(&mut filter, &[]).unwrap();
    world.new_entities(1000, &[a, b], &[], None).unwrap();

    let cached = world.cached_tables(cache).unwrap().to_vec();
    assert_eq!(cached.len(), 1);
    assert_eq!(world.table(cached[0]).unwrap().len(), 1000);

    let uncached = world.matching_tables(&Filter::new(&[a, b]), &[]).unwrap();
    assert_eq!(cached, uncached);
    assert_eq!(world.stats().entities, 1000);
}

#[test]
fn pinned_caches_follow_target_removal_and_table_reuse() {
    let mut world = World::new();
    let a = world.register_component::<A>().unwrap();
    let child_of = world.register_component::<ChildOf>().unwrap();

    let p = world.new_entity(&[a], &[]).unwrap();
    let q = world.new_entity(&[a], &[]).unwrap();
    for parent in [p, p, q] {
        world.new_entity(&[a, child_of], &[Relation::new(child_of, parent)]).unwrap();
    }

    let mut of_p = Filter::new(&[child_of]);
    let mut of_q = Filter::new(&[child_of]);
    let mut of_any = Filter::new(&[child_of]);
    world.register_filter(&mut of_p, &[Relation::new(child_of, p)]).unwrap();
    world.register_filter(&mut of_q, &[Relation::new(child_of, q)]).unwrap();
    world.register_filter(&mut of_any, &[Relation::new(child_of, Entity::WILDCARD)]).unwrap();

    let check = |world: &World, pinned: &[(&Filter, Entity)]| {
        for &(filter, target) in pinned {
            let relations = [Relation::new(child_of, target)];
            let brute: Vec<TableId> = world
                .archetypes()
                .iter()
                .filter(|arche| filter.matches(arche.mask()))
                .flat_map(|arche| arche.tables().iter().copied())
                .filter(|&t| world.table(t).unwrap().matches(&relations))
                .collect();
            let cached = world.cached_tables(filter.cache().unwrap()).unwrap().to_vec();
            assert_eq!(sorted(cached), sorted(brute));
        }
    };
    let pinned = [(&of_p, p), (&of_q, q), (&of_any, Entity::WILDCARD)];

    check(&world, &pinned);
    assert_eq!(world.cached_tables(of_p.cache().unwrap()).unwrap().len(), 1);
    let freed = world.cached_tables(of_p.cache().unwrap()).unwrap()[0];

    world.remove_entity(p).unwrap();
    check(&world, &pinned);
    assert!(world.cached_tables(of_p.cache().unwrap()).unwrap().is_empty());
    // q's table and the reset table
    assert_eq!(world.cached_tables(of_any.cache().unwrap()).unwrap().len(), 2);

    let arche = world.table(world.cached_tables(of_q.cache().unwrap()).unwrap()[0]).unwrap().archetype();
    assert_eq!(world.archetypes().get(arche).unwrap().free_tables(), &[freed]);

    let r = world.new_entity(&[a], &[]).unwrap();
    let mut of_r = Filter::new(&[child_of]);
    world.register_filter(&mut of_r, &[Relation::new(child_of, r)]).unwrap();
    assert!(world.cached_tables(of_r.cache().unwrap()).unwrap().is_empty());

    let child = world.new_entity(&[a, child_of], &[Relation::new(child_of, r)]).unwrap();
    assert!(world.archetypes().get(arche).unwrap().free_tables().is_empty());
    assert_eq!(world.cached_tables(of_r.cache().unwrap()).unwrap(), &[freed]);
    assert_eq!(world.table(freed).unwrap().entities(), &[child]);
    assert_eq!(world.table(freed).unwrap().target_of(child_of), Some(r));

    let pinned = [(&of_p, p), (&of_q, q), (&of_any, Entity::WILDCARD), (&of_r, r)];
    check(&world, &pinned);
    assert!(world.cached_tables(of_p.cache().unwrap()).unwrap().is_empty());
    assert_eq!(world.cached_tables(of_any.cache().unwrap()).unwrap().len(), 3);
}
