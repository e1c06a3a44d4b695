//! Queue runs driven by the binary's startup helpers

use itemqueue::app::cli::NumberFilter;
use itemqueue::app::startup::{read_numbers, sum_numbers};
use itemqueue::queue::api::QueueOptions;

#[test]
fn test_sum_from_text_input() {
    let numbers = read_numbers("3 4 5\n6\n".as_bytes()).unwrap();
    let summary = sum_numbers(numbers, NumberFilter::Odd, QueueOptions::with_name("odd"), true)
        .unwrap();

    assert_eq!(summary.queue_name, "odd");
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.sum, 8);
}

#[test]
fn test_empty_input_sums_to_zero() {
    let summary = sum_numbers(Vec::new(), NumberFilter::All, QueueOptions::default(), true).unwrap();

    assert_eq!(summary.enqueued, 0);
    assert_eq!(summary.sum, 0);
}
