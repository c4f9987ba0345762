// Replays a recorded touch trace and prints the cursor updates as JSON.

fn main() {
    touchflow_lib::run();
}
