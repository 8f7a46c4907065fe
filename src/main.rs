fn main() {
    dashboard_chat_lib::run()
}
