//! Unit tests for the event queue.

#[cfg(test)]
mod event_queue {
    use ls_core::SimTime;

    use crate::{EventQueue, ScheduleError, Scheduler};

    #[test]
    fn delivers_in_time_order() {
        let mut q = EventQueue::new(SimTime::ZERO);
        q.schedule_at(SimTime(2.0), "late").unwrap();
        q.schedule_at(SimTime(0.5), "early").unwrap();
        q.schedule_at(SimTime(1.0), "middle").unwrap();
        assert_eq!(q.len(), 3);
        assert_eq!(q.next_time(), Some(SimTime(0.5)));

        let order: Vec<_> = std::iter::from_fn(|| q.pop_next()).map(|(_, e)| e).collect();
        assert_eq!(order, ["early", "middle", "late"]);
        assert!(q.is_empty());
        assert_eq!(q.now(), SimTime(2.0));
    }

    #[test]
    fn same_time_is_fifo() {
        let mut q = EventQueue::new(SimTime(1.0));
        q.schedule_at(SimTime(3.0), 1).unwrap();
        q.schedule_at(SimTime(3.0), 2).unwrap();
        q.schedule_now(0).unwrap();
        assert_eq!(q.time_count(), 2);
        assert_eq!(q.pop_next(), Some((SimTime(1.0), 0)));
        assert_eq!(q.pop_next(), Some((SimTime(3.0), 1)));
        assert_eq!(q.pop_next(), Some((SimTime(3.0), 2)));
        assert_eq!(q.pop_next(), None);
    }

    #[test]
    fn schedule_now_follows_clock() {
        let mut q = EventQueue::default();
        q.schedule_at(SimTime(4.0), 'a').unwrap();
        q.pop_next();
        q.schedule_now('b').unwrap();
        assert_eq!(q.pop_next(), Some((SimTime(4.0), 'b')));
    }

    #[test]
    fn rejects_past_and_nan() {
        let mut q = EventQueue::new(SimTime(5.0));
        assert!(matches!(
            q.schedule_at(SimTime(4.0), ()),
            Err(ScheduleError::InPast { .. })
        ));
        assert!(matches!(
            q.schedule_at(SimTime(f64::NAN), ()),
            Err(ScheduleError::NonFiniteTime(_))
        ));
        assert!(q.is_empty());
    }
}
