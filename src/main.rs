fn main() {
    itemqueue::app::startup::startup();
}
