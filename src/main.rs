use burden::error::AppResult;

fn main() -> AppResult<()> {
    burden::entry::run()
}
