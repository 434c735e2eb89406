mod common;

use cadence_commands::{factory, AutoBuilder, CommandExt, InstantCommand, WaitCommand};
use cadence_core::{CommandHandle, ManualClock, Requirements, SubsystemHandle};
use cadence_execution::Scheduler;
use common::{boundaries, count, init_tracing, position, Log, Step};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

fn tick_until_idle(scheduler: &mut Scheduler, command: &CommandHandle, limit: usize) -> usize {
    for ticks in 1..=limit {
        scheduler.tick();
        if !scheduler.is_scheduled(command) {
            return ticks;
        }
    }
    panic!("{} still running after {} ticks", command.name(), limit);
}

#[test]
fn test_preempted_command_ends_before_new_one_starts() {
    init_tracing();
    let log = Log::default();
    let x = SubsystemHandle::new("x", ());
    let a = Step::endless("a", &log).requiring(x.id()).into_handle();
    let b = Step::endless("b", &log).requiring(x.id()).into_handle();

    let mut scheduler = Scheduler::new();
    scheduler.schedule(&a);
    scheduler.tick();
    scheduler.schedule(&b);

    let ended = position(&log, "a:end:true").unwrap();
    let started = position(&log, "b:init").unwrap();
    assert!(ended < started);
    assert_eq!(scheduler.owner_of(x.id()), Some(&b));
    assert!(!scheduler.is_scheduled(&a));
}

#[test]
fn test_every_subsystem_has_at_most_one_owner() {
    init_tracing();
    let log = Log::default();
    let x = SubsystemHandle::new("x", ());
    let y = SubsystemHandle::new("y", ());
    let z = SubsystemHandle::new("z", ());

    let commands = [
        Step::endless("xy", &log).requiring(x.id()).requiring(y.id()).into_handle(),
        Step::finishing_after("yz", 2, &log).requiring(y.id()).requiring(z.id()).into_handle(),
        Step::endless("x", &log).requiring(x.id()).into_handle(),
        Step::finishing_after("free", 1, &log).into_handle(),
    ];

    let mut scheduler = Scheduler::new();
    for round in 0..12 {
        scheduler.schedule(&commands[round % commands.len()]);
        if round % 3 == 0 {
            scheduler.tick();
        }

        let mut claimed = HashSet::new();
        for command in scheduler.active_commands() {
            for subsystem in command.requirements() {
                assert!(claimed.insert(subsystem), "{subsystem} claimed twice");
                assert_eq!(scheduler.owner_of(subsystem), Some(command));
            }
        }
    }
}

#[test]
fn test_zero_wait_sequence_records_start_then_end() {
    init_tracing();
    let log = Log::default();
    let (start, end) = (log.clone(), log.clone());

    let routine = factory::sequence([
        InstantCommand::new(move || start.borrow_mut().push("start".into())).boxed(),
        factory::wait_seconds(0.0).boxed(),
        InstantCommand::new(move || end.borrow_mut().push("end".into())).boxed(),
    ])
    .into_handle();

    let mut scheduler = Scheduler::new();
    scheduler.schedule(&routine);
    let ticks = tick_until_idle(&mut scheduler, &routine, 10);

    assert_eq!(ticks, 3);
    assert_eq!(*log.borrow(), vec!["start", "end"]);
}

#[test]
fn test_sequence_restarts_from_first_child() {
    let log = Log::default();
    let routine = factory::sequence([
        Step::finishing_after("a", 1, &log).boxed(),
        Step::finishing_after("b", 2, &log).boxed(),
    ])
    .into_handle();

    let mut scheduler = Scheduler::new();
    for run in 1..=2 {
        scheduler.schedule(&routine);
        tick_until_idle(&mut scheduler, &routine, 10);
        assert_eq!(count(&log, "a:init"), run);
        assert_eq!(count(&log, "b:init"), run);
        assert_eq!(count(&log, "b:end:false"), run);
    }
}

#[test]
fn test_parallel_finishes_with_last_child() {
    let log = Log::default();
    let group = factory::parallel([
        Step::finishing_after("fast", 1, &log).boxed(),
        Step::finishing_after("slow", 3, &log).boxed(),
    ])
    .into_handle();

    let mut scheduler = Scheduler::new();
    scheduler.schedule(&group);

    scheduler.tick();
    assert_eq!(count(&log, "fast:end:false"), 1);
    assert!(scheduler.is_scheduled(&group));

    scheduler.tick();
    assert!(scheduler.is_scheduled(&group));

    scheduler.tick();
    assert!(!scheduler.is_scheduled(&group));
    assert_eq!(count(&log, "fast:end:false"), 1);
    assert_eq!(count(&log, "slow:end:false"), 1);
    assert_eq!(count(&log, "fast:end:true") + count(&log, "slow:end:true"), 0);
}

#[test]
fn test_cancelled_parallel_interrupts_only_running_children() {
    let log = Log::default();
    let group = factory::parallel([
        Step::finishing_after("done", 1, &log).boxed(),
        Step::endless("left", &log).boxed(),
        Step::endless("right", &log).boxed(),
    ])
    .into_handle();

    let mut scheduler = Scheduler::new();
    scheduler.schedule(&group);
    scheduler.tick();
    scheduler.cancel(&group);

    assert_eq!(count(&log, "left:end:true"), 1);
    assert_eq!(count(&log, "right:end:true"), 1);
    assert_eq!(count(&log, "done:end:true"), 0);
    assert_eq!(count(&log, "done:end:false"), 1);
}

#[test]
fn test_group_claims_union_of_children() {
    let log = Log::default();
    let arm = SubsystemHandle::new("arm", ());
    let claw = SubsystemHandle::new("claw", ());
    let expected: Requirements = [arm.id(), claw.id()].into_iter().collect();

    let sequence = factory::sequence([
        Step::finishing_after("lift", 1, &log).requiring(arm.id()).boxed(),
        Step::endless("grab", &log).requiring(claw.id()).boxed(),
    ])
    .into_handle();
    let parallel = factory::parallel([
        Step::endless("lift", &log).requiring(arm.id()).boxed(),
        Step::endless("grab", &log).requiring(claw.id()).boxed(),
    ])
    .into_handle();

    assert_eq!(sequence.requirements(), expected);
    assert_eq!(parallel.requirements(), expected);

    let mut scheduler = Scheduler::new();
    scheduler.schedule(&sequence);
    scheduler.tick();
    // The first child is done, but the group still holds both.
    assert_eq!(sequence.requirements(), expected);
    assert_eq!(scheduler.owner_of(arm.id()), Some(&sequence));
    assert_eq!(scheduler.owner_of(claw.id()), Some(&sequence));

    scheduler.schedule(&parallel);
    assert!(!scheduler.is_scheduled(&sequence));
    assert_eq!(scheduler.owner_of(arm.id()), Some(&parallel));
}

#[test]
fn test_default_command_gating() {
    init_tracing();
    let log = Log::default();
    let drive = SubsystemHandle::new("drive", ());
    let fallback = Step::endless("idle", &log).requiring(drive.id()).into_handle();
    drive.set_default_command(fallback.clone());

    let mut scheduler = Scheduler::new();
    scheduler.register_subsystem(&drive);

    scheduler.tick();
    assert_eq!(count(&log, "idle:init"), 1);

    let manual = Step::finishing_after("manual", 2, &log).requiring(drive.id()).into_handle();
    scheduler.schedule(&manual);
    assert_eq!(count(&log, "idle:end:true"), 1);

    scheduler.tick();
    scheduler.tick();
    assert_eq!(count(&log, "manual:end:false"), 1);
    assert_eq!(count(&log, "idle:init"), 1);

    scheduler.tick();
    assert_eq!(count(&log, "idle:init"), 2);
    assert_eq!(scheduler.owner_of(drive.id()), Some(&fallback));
}

#[test]
fn test_overlapping_fallbacks_do_not_preempt_each_other() {
    init_tracing();
    let log = Log::default();
    let arm = SubsystemHandle::new("arm", ());
    let wrist = SubsystemHandle::new("wrist", ());
    arm.set_default_command(
        Step::endless("stow", &log).requiring(arm.id()).requiring(wrist.id()).into_handle(),
    );
    wrist.set_default_command(Step::endless("level", &log).requiring(wrist.id()).into_handle());

    let mut scheduler = Scheduler::new();
    scheduler.register_subsystem(&arm);
    scheduler.register_subsystem(&wrist);
    for _ in 0..4 {
        scheduler.tick();
    }

    assert_eq!(boundaries(&log), vec!["stow:init"]);
    assert_eq!(count(&log, "level:init"), 0);
}

#[test]
fn test_command_can_schedule_follow_up_through_handle() {
    let log = Log::default();
    let lift = SubsystemHandle::new("lift", ());
    let hold = Step::endless("hold", &log).requiring(lift.id()).into_handle();
    let raise = Step::endless("raise", &log).requiring(lift.id()).into_handle();

    let mut scheduler = Scheduler::new();
    scheduler.schedule(&hold);

    let handle = scheduler.handle();
    let queued = raise.clone();
    let kick = InstantCommand::new(move || handle.schedule(&queued)).into_handle();
    scheduler.schedule(&kick);
    scheduler.tick();

    assert!(scheduler.is_scheduled(&raise));
    assert!(!scheduler.is_scheduled(&hold));
    assert_eq!(
        boundaries(&log),
        vec!["hold:init", "hold:end:true", "raise:init"]
    );
}

#[test]
fn test_timed_routine_with_manual_clock() {
    let clock = ManualClock::new();
    let log = Log::default();
    let (first, second) = (log.clone(), log.clone());

    let routine = AutoBuilder::new()
        .run(move || first.borrow_mut().push("drive".into()))
        .command(WaitCommand::new(Duration::from_millis(500)).with_clock(Rc::new(clock.clone())))
        .run(move || second.borrow_mut().push("score".into()))
        .build()
        .into_named_handle("auto");

    let mut scheduler = Scheduler::new();
    scheduler.schedule(&routine);

    for _ in 0..5 {
        scheduler.tick();
    }
    assert_eq!(*log.borrow(), vec!["drive"]);

    clock.advance(Duration::from_millis(500));
    tick_until_idle(&mut scheduler, &routine, 5);
    assert_eq!(*log.borrow(), vec!["drive", "score"]);
}

#[test]
fn test_cancel_all_then_fallbacks_return() {
    let log = Log::default();
    let intake = SubsystemHandle::new("intake", ());
    let fallback = Step::endless("stow", &log).requiring(intake.id()).into_handle();
    intake.set_default_command(fallback.clone());

    let mut scheduler = Scheduler::new();
    scheduler.register_subsystem(&intake);
    scheduler.schedule(&Step::endless("spin", &log).into_handle());
    scheduler.tick();
    assert_eq!(scheduler.active_count(), 2);

    scheduler.cancel_all();
    assert_eq!(scheduler.active_count(), 0);
    assert_eq!(count(&log, "spin:end:true"), 1);
    assert_eq!(count(&log, "stow:end:true"), 1);

    scheduler.tick();
    assert!(scheduler.is_scheduled(&fallback));
}
