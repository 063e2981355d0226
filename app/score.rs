use std::sync::atomic::{AtomicU64, Ordering};

/// How often the model has guessed the speaker right, across every game served since startup.
#[derive(Debug, Default)]
pub struct Score {
	num_total: AtomicU64,
	num_correct: AtomicU64,
}

impl Score {
	/// Count one game and return `(num_correct, num_total)` including it.
	pub fn record(&self, correct: bool) -> (u64, u64) {
		let num_correct = if correct {
			self.num_correct.fetch_add(1, Ordering::SeqCst) + 1
		} else {
			self.num_correct.load(Ordering::SeqCst)
		};
		let num_total = self.num_total.fetch_add(1, Ordering::SeqCst) + 1;
		(num_correct.min(num_total), num_total)
	}
}

#[test]
fn test_record() {
	let score = Score::default();
	assert_eq!(score.record(true), (1, 1));
	assert_eq!(score.record(false), (1, 2));
	assert_eq!(score.record(true), (2, 3));
}

#[test]
fn test_record_concurrently() {
	let score = std::sync::Arc::new(Score::default());
	let handles = (0..8)
		.map(|i| {
			let score = score.clone();
			std::thread::spawn(move || {
				for _ in 0..100 {
					score.record(i % 2 == 0);
				}
			})
		})
		.collect::<Vec<_>>();
	for handle in handles {
		handle.join().unwrap();
	}
	assert_eq!(score.record(false), (400, 801));
}
