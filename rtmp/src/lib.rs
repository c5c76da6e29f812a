/*!
A server side RTMP session engine.

The crate is split into layers that can be used on their own:

* `handshake` performs the server half of the RTMP handshake, simple or digest based.
* `chunk_io` turns a byte stream into RTMP messages and RTMP messages back into chunks.
* `messages` gives the payloads of protocol control, command and data messages meaning.
* `sessions` ties everything together into a `ServerSession`, which runs the connect, publish
  and play workflows and hands media and decisions to the application.

None of the layers perform any I/O of their own.  Bytes are handed in as they arrive, in
whatever fragments the transport produced, and responses are written to an `std::io::Write`
(or returned) so the application is free to use any networking model it wants.
*/

pub mod chunk_io;
pub mod cursor;
pub mod handshake;
pub mod messages;
pub mod sessions;
