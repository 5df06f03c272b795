use std::io::{self, BufRead, BufReader, Read, Write};
use std::thread;

/// Copy two readers to two writers concurrently, returning once both are
/// exhausted. Neither stream's backlog can stall the other.
pub fn copy_streams<A, B>(
    stdout: A,
    stderr: B,
    out: &mut (dyn Write + Send),
    err: &mut (dyn Write + Send),
) -> io::Result<()>
where
    A: Read + Send,
    B: Read + Send,
{
    thread::scope(|s| {
        let out_handle = s.spawn(move || forward(stdout, out));
        let err_handle = s.spawn(move || forward(stderr, err));

        // Join both before inspecting either result.
        let out_result = join(out_handle);
        let err_result = join(err_handle);
        out_result.and(err_result)
    })
}

/// Like [`copy_streams`], but line-oriented: every line is handed to
/// `inspect` after it has been written through. Used for build output.
pub fn tee_lines<A, B, F>(
    stdout: A,
    stderr: B,
    out: &mut (dyn Write + Send),
    err: &mut (dyn Write + Send),
    inspect: F,
) -> io::Result<()>
where
    A: Read + Send,
    B: Read + Send,
    F: Fn(&str) + Sync,
{
    let inspect = &inspect;
    thread::scope(|s| {
        let out_handle = s.spawn(move || forward_lines(stdout, out, inspect));
        let err_handle = s.spawn(move || forward_lines(stderr, err, inspect));

        let out_result = join(out_handle);
        let err_result = join(err_handle);
        out_result.and(err_result)
    })
}

fn forward<R: Read>(mut reader: R, writer: &mut (dyn Write + Send)) -> io::Result<()> {
    io::copy(&mut reader, writer)?;
    writer.flush()
}

fn forward_lines<R: Read>(
    reader: R,
    writer: &mut (dyn Write + Send),
    inspect: &(dyn Fn(&str) + Sync),
) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        writer.write_all(&line)?;
        // Build output is progress text; flush per line so it shows up live.
        writer.flush()?;
        inspect(String::from_utf8_lossy(&line).trim_end());
    }
    Ok(())
}

fn join(handle: thread::ScopedJoinHandle<'_, io::Result<()>>) -> io::Result<()> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("stream copy thread panicked")))
}
