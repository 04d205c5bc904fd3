use rampart::error::AppResult;

fn main() -> AppResult<()> {
    rampart::entry::run()
}
