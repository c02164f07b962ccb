use nom_spartn::{Frame, SpartnStream};

fn main() {
    // A single OCB-like frame with a 32 bit time tag and CRC-24
    let buffer = hex::decode("73E801A218CDFE6000A20000010203E2900D").unwrap();

    let frame = Frame::try_from(&buffer[..]).unwrap();
    println!("{frame:#?}");
    println!("time tag: {:?}", frame.time_tag.to_datetime());

    // Same bytes twice, read through a stream
    let doubled = [buffer.clone(), buffer].concat();
    let mut stream = SpartnStream::new(std::io::Cursor::new(doubled));
    for frame in stream.frames() {
        println!("{:?}", frame.map(|f| f.message_type));
    }
}
