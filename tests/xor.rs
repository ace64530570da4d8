//! End-to-end convergence tests on the XOR problem

use ndarray::array;
use rust_backprop::nn::NetworkBuilder;
use rust_backprop::training::{Trainer, TrainerConfig, TrainingRecord};

fn xor_records() -> Vec<TrainingRecord> {
    vec![
        TrainingRecord::new(array![0.0, 0.0], array![0.0]),
        TrainingRecord::new(array![0.0, 1.0], array![1.0]),
        TrainingRecord::new(array![1.0, 0.0], array![1.0]),
        TrainingRecord::new(array![1.0, 1.0], array![0.0]),
    ]
}

/// Train a [2, 2, 1] sigmoid network stochastically and check that outputs
/// separate the two classes. Random initialization can land in a local
/// minimum, so a handful of fresh restarts is allowed before failing.
#[test]
fn xor_converges_with_builtin_momentum_rule() {
    let records = xor_records();

    for attempt in 0..5 {
        let mut network = NetworkBuilder::new(&[2, 2, 1])
            .learning_rate(0.5)
            .momentum(0.9)
            .build()
            .unwrap();

        for _ in 0..4000 {
            for record in &records {
                network.train(&record.input, &record.output).unwrap();
            }
        }

        let low_a = network.eval(&array![0.0, 0.0]).unwrap()[0];
        let low_b = network.eval(&array![1.0, 1.0]).unwrap()[0];
        let high_a = network.eval(&array![0.0, 1.0]).unwrap()[0];
        let high_b = network.eval(&array![1.0, 0.0]).unwrap()[0];

        if low_a < 0.1 && low_b < 0.1 && high_a > 0.9 && high_b > 0.9 {
            return;
        }
        eprintln!(
            "attempt {attempt}: outputs not separated yet \
             ({low_a:.3}, {high_a:.3}, {high_b:.3}, {low_b:.3}), restarting"
        );
    }
    panic!("XOR did not converge in 5 restarts");
}

/// The trainer front-end reaches the same result and reports its history.
#[test]
fn xor_converges_through_trainer() {
    let records = xor_records();

    for _ in 0..5 {
        let mut network = NetworkBuilder::new(&[2, 2, 1])
            .learning_rate(0.5)
            .momentum(0.9)
            .build()
            .unwrap();

        let config = TrainerConfig {
            epochs: 4000,
            ..Default::default()
        };
        let report = Trainer::new(&mut network, config).train(&records).unwrap();
        assert_eq!(report.history.len(), report.epochs_trained);

        if report.final_error < 0.01 {
            let out = network.eval(&array![1.0, 0.0]).unwrap();
            assert!(out[0] > 0.9);
            return;
        }
    }
    panic!("XOR did not converge through the trainer in 5 restarts");
}
