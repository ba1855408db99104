//! Features Command
//!
//! Print the detector's view of the processor.

/// Print enabled flags (or all flags with their state), then the dispatch choices.
pub fn run(all: bool) {
    let features = powcore::detect_features();

    if all {
        for (name, on) in features.iter() {
            println!("{name:<12} {}", if on { "yes" } else { "no" });
        }
    } else {
        let enabled: Vec<&str> = features.enabled().collect();
        println!("features: {}", enabled.join(" "));
    }

    println!("backend:  {}", powcore::active_backend());
    println!(
        "fast cn:  {}",
        if powcore::fast_available() { "aes-ni" } else { "unavailable" }
    );
}
